//! Error types for the PDF pages MCP server

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the PDF pages MCP server
pub type Result<T> = std::result::Result<T, Error>;

/// Stable error category reported to the calling agent.
///
/// The serialized tag never changes, so a caller can branch on it: validation
/// and range errors are worth retrying with corrected arguments, open and
/// write errors are definitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    DocumentOpenError,
    EmptyDocumentError,
    PageRangeOutOfBoundsError,
    OutputWriteError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::DocumentOpenError => "DocumentOpenError",
            ErrorKind::EmptyDocumentError => "EmptyDocumentError",
            ErrorKind::PageRangeOutOfBoundsError => "PageRangeOutOfBoundsError",
            ErrorKind::OutputWriteError => "OutputWriteError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for the PDF pages MCP server
#[derive(Error, Debug)]
pub enum Error {
    /// A tool argument is missing or has the wrong shape, type or value
    #[error("Invalid argument `{field}`: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// Path falls outside the configured resource directories
    #[error("Path access denied: {path}")]
    PathAccessDenied { path: String },

    /// Source file could not be read from disk
    #[error("Failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a parseable PDF
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is encrypted and no password handling is offered
    #[error("PDF is password protected")]
    PasswordRequired,

    /// PDFium could not be bound or failed while reading page content
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// Document has no pages at all
    #[error("PDF has no pages")]
    EmptyDocument,

    /// Requested range starts beyond the last page
    #[error("Start page {start} is beyond the end of the document (total: {total})")]
    PageRangeOutOfBounds { start: u32, total: u32 },

    /// Subset PDF could not be produced or saved
    #[error("Failed to write {path}: {reason}")]
    OutputWrite { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Category tag for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument { .. } | Error::PathAccessDenied { .. } => {
                ErrorKind::ValidationError
            }
            Error::Unreadable { .. }
            | Error::InvalidPdf { .. }
            | Error::PasswordRequired
            | Error::Pdfium { .. } => ErrorKind::DocumentOpenError,
            Error::EmptyDocument => ErrorKind::EmptyDocumentError,
            Error::PageRangeOutOfBounds { .. } => ErrorKind::PageRangeOutOfBoundsError,
            Error::OutputWrite { .. } => ErrorKind::OutputWriteError,
        }
    }

    /// Return a sanitized error message safe to send to clients.
    /// Library internals are omitted; argument problems are spelled out so
    /// the caller can correct them. Full details should be logged via
    /// tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::InvalidArgument { .. } => self.to_string(),
            Error::PathAccessDenied { .. } => "Access denied".to_string(),
            Error::Unreadable { .. } => "PDF could not be read".to_string(),
            Error::InvalidPdf { .. } => "Invalid PDF file".to_string(),
            Error::PasswordRequired => "PDF is password protected".to_string(),
            Error::Pdfium { .. } => "PDF processing error".to_string(),
            Error::EmptyDocument => "PDF has no pages".to_string(),
            Error::PageRangeOutOfBounds { start, total } => format!(
                "Start page {} is beyond the end of the document ({} pages)",
                start, total
            ),
            Error::OutputWrite { .. } => "Failed to write output PDF".to_string(),
        }
    }

    /// Structured form of this error for the tool boundary
    pub fn to_tool_error(&self) -> ToolError {
        ToolError {
            kind: self.kind(),
            message: self.client_message(),
        }
    }
}

/// Error object returned across the tool boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
}
