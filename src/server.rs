//! MCP Server implementation using rmcp

use crate::engine::ExtractionResult;
use crate::pdf::NativeBackend;
use crate::request::ExtractPagesParams;
use anyhow::Result;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*, tool,
    tool_handler, tool_router, ServerHandler, ServiceExt,
};
use std::sync::Arc;

/// Configuration for the PDF pages MCP server
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Directories that source and output paths must stay within.
    /// Empty means unrestricted.
    pub resource_dirs: Vec<String>,
}

/// PDF pages MCP server
#[derive(Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
    /// Server configuration
    config: Arc<ServerConfig>,
}

#[tool_router]
impl PdfServer {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a new PdfServer restricted to the given directories
    pub fn with_resource_dirs(dirs: Vec<String>) -> Self {
        Self::with_config(ServerConfig {
            resource_dirs: dirs,
        })
    }

    /// Create a new PdfServer with full configuration
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            tool_router: Self::tool_router(),
            config: Arc::new(config),
        }
    }

    /// Extract the text of a page range, optionally saving those pages as a new PDF
    #[tool(
        description = "Open a PDF and extract the text of pages start_page..end_page (1-indexed, inclusive). Returns one text entry per page in `text` and the range actually used in `pages_extracted`; an end_page past the last page is clamped to the last page. Set save_as_pdf=true with an output_path to also write the selected pages as a new PDF.

On failure the response is {\"error\": {\"kind\": ..., \"message\": ...}}. ValidationError and PageRangeOutOfBoundsError can be fixed by changing the arguments; DocumentOpenError, EmptyDocumentError and OutputWriteError cannot."
    )]
    async fn extract_pages(&self, Parameters(params): Parameters<ExtractPagesParams>) -> String {
        let response = match self.process_extract_pages(params).await {
            Ok(result) => serde_json::to_value(&result).unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, kind = %e.kind(), "extract_pages failed");
                serde_json::json!({ "error": e.to_tool_error() })
            }
        };
        serde_json::to_string_pretty(&response).unwrap_or_default()
    }
}

impl PdfServer {
    async fn process_extract_pages(
        &self,
        params: ExtractPagesParams,
    ) -> crate::error::Result<ExtractionResult> {
        let config = Arc::clone(&self.config);

        // Move CPU-heavy PDF work to blocking thread pool
        tokio::task::spawn_blocking(move || {
            crate::engine::extract_pages(&NativeBackend, &params, &config.resource_dirs)
        })
        .await
        .map_err(|e| crate::error::Error::Pdfium {
            reason: format!("Task join error: {}", e),
        })?
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "PDF pages server. Use extract_pages to read the text of a page range from a \
                 PDF file and optionally save those pages as a new PDF."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server without path restrictions
pub async fn run_server() -> Result<()> {
    run_server_with_config(ServerConfig::default()).await
}

/// Run the MCP server restricted to the given directories
pub async fn run_server_with_dirs(resource_dirs: Vec<String>) -> Result<()> {
    run_server_with_config(ServerConfig { resource_dirs }).await
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    if !config.resource_dirs.is_empty() {
        tracing::info!(dirs = ?config.resource_dirs, "Restricting file access");
    }
    let server = PdfServer::with_config(config);

    tracing::info!("PDF pages MCP server ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
