//! PDF Pages MCP Server - Entry point
//!
//! Usage: `pdf-pages-mcp [RESOURCE_DIR ...]`. When directories are given,
//! source and output paths must stay inside them.

use pdf_pages_mcp::{pdf::pdfium_available, run_server_with_dirs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr; stdout carries the MCP transport
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_pages_mcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting PDF Pages MCP Server v{}", env!("CARGO_PKG_VERSION"));

    if !pdfium_available() {
        tracing::warn!("PDFium library not found; text extraction will fail until one is installed");
    }

    let resource_dirs: Vec<String> = std::env::args().skip(1).collect();
    run_server_with_dirs(resource_dirs).await
}
