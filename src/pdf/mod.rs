//! PDF processing layer
//!
//! The capability interface the engine depends on, and its production
//! implementation on top of qpdf and PDFium.

mod backend;
mod qpdf;
mod text;

pub use backend::{NativeBackend, NativeDocument, PdfBackend, PdfDocumentHandle};
pub use qpdf::QpdfDocument;
pub use text::{extract_pages_text, pdfium_available};
