//! PDF Pages MCP Server Library
//!
//! This crate provides one MCP tool, `extract_pages`, which reads the text of
//! a page range from a PDF and can save those pages as a new PDF:
//! - `request`: validates raw tool arguments into an `ExtractionRequest`
//! - `engine`: resolves the range against the document and extracts
//! - `pdf`: the PDF capability interface and its qpdf/PDFium implementation
//! - `server`: the rmcp server exposing the tool over stdio

pub mod engine;
pub mod error;
pub mod pdf;
pub mod request;
pub mod server;

pub use engine::{extract, extract_pages, ExtractionResult};
pub use error::{Error, ErrorKind, Result, ToolError};
pub use request::{validate, ExtractPagesParams, ExtractionRequest, PageRange};
pub use server::{run_server, run_server_with_config, run_server_with_dirs, PdfServer, ServerConfig};
