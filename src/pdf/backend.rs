//! PDF capability interface
//!
//! The extraction engine only needs four things from a PDF library: open a
//! file, count pages, read page text and copy pages into a new document.
//! Keeping them behind these traits lets the engine run against a fake in
//! tests and keeps library types out of the engine.

use crate::error::{Error, Result};
use crate::pdf::qpdf::QpdfDocument;
use crate::pdf::text::extract_pages_text;
use crate::request::PageRange;
use std::path::Path;

/// Opens documents
pub trait PdfBackend {
    type Document: PdfDocumentHandle;

    /// Open the document at `path`. Every failure (unreadable, not a PDF,
    /// corrupt, encrypted) is a document-open error.
    fn open(&self, path: &Path) -> Result<Self::Document>;
}

/// An open document. Dropping it releases every library resource.
pub trait PdfDocumentHandle {
    fn page_count(&self) -> u32;

    /// Text of one page (1-indexed)
    fn page_text(&self, page: u32) -> Result<String>;

    /// Text of every page in `range`, in page order
    fn pages_text(&self, range: PageRange) -> Result<Vec<String>> {
        range.pages().map(|page| self.page_text(page)).collect()
    }

    /// Serialize a new PDF holding exactly the pages of `range`, in order
    fn copy_pages(&self, range: PageRange) -> Result<Vec<u8>>;
}

/// Production backend: qpdf for document structure, PDFium for text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl PdfBackend for NativeBackend {
    type Document = NativeDocument;

    fn open(&self, path: &Path) -> Result<NativeDocument> {
        let data = std::fs::read(path).map_err(|source| Error::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let structure = QpdfDocument::open(&data)?;
        Ok(NativeDocument { data, structure })
    }
}

/// A document opened by [`NativeBackend`]
pub struct NativeDocument {
    // PDFium reloads from these bytes for text extraction
    data: Vec<u8>,
    structure: QpdfDocument,
}

impl PdfDocumentHandle for NativeDocument {
    fn page_count(&self) -> u32 {
        self.structure.page_count()
    }

    fn page_text(&self, page: u32) -> Result<String> {
        let range = PageRange::new(page, page)?;
        let mut texts = self.pages_text(range)?;
        texts.pop().ok_or_else(|| Error::Pdfium {
            reason: format!("no text returned for page {}", page),
        })
    }

    fn pages_text(&self, range: PageRange) -> Result<Vec<String>> {
        extract_pages_text(&self.data, range)
    }

    fn copy_pages(&self, range: PageRange) -> Result<Vec<u8>> {
        self.structure.copy_pages(range)
    }
}
