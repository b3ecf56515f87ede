//! qpdf FFI wrapper for document structure
//!
//! Opening, page counting and copying a page range into a fresh document all
//! go through the qpdf crate (vendored FFI).

use crate::error::{Error, Result};
use crate::request::PageRange;
use qpdf::QPdf;

/// Map qpdf crate errors raised while opening a document
fn map_open_error(e: qpdf::QPdfError) -> Error {
    match e.error_code() {
        qpdf::QPdfErrorCode::InvalidPassword => Error::PasswordRequired,
        _ => Error::InvalidPdf {
            reason: e.to_string(),
        },
    }
}

/// Check the `%PDF` header before handing bytes to any library
pub(crate) fn check_signature(data: &[u8]) -> Result<()> {
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::InvalidPdf {
            reason: "Not a valid PDF file".to_string(),
        });
    }
    Ok(())
}

/// A PDF loaded into qpdf
pub struct QpdfDocument {
    qpdf: QPdf,
    page_count: u32,
}

impl QpdfDocument {
    /// Load a PDF from memory
    pub fn open(data: &[u8]) -> Result<Self> {
        check_signature(data)?;
        let qpdf = QPdf::read_from_memory(data).map_err(map_open_error)?;
        let page_count = qpdf.get_num_pages().map_err(map_open_error)?;
        Ok(Self { qpdf, page_count })
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Build a new PDF from the pages in `range`, keeping their order.
    ///
    /// The range must already be clamped to the page count.
    pub fn copy_pages(&self, range: PageRange) -> Result<Vec<u8>> {
        let dest = QPdf::empty();

        for idx in range.zero_based() {
            let page = self.qpdf.get_page(idx).ok_or(Error::PageRangeOutOfBounds {
                start: idx + 1,
                total: self.page_count,
            })?;
            let copied = dest.copy_from_foreign(&page);
            dest.add_page(&copied, false)
                .map_err(|e| Error::InvalidPdf {
                    reason: format!("failed to copy page {}: {}", idx + 1, e),
                })?;
        }

        let mut writer = dest.writer();
        writer.preserve_encryption(false);
        writer.write_to_memory().map_err(|e| Error::InvalidPdf {
            reason: format!("failed to serialize subset: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_check() {
        assert!(check_signature(b"%PDF-1.7").is_ok());
        assert!(matches!(
            check_signature(b"PK\x03\x04"),
            Err(Error::InvalidPdf { .. })
        ));
        assert!(check_signature(b"").is_err());
    }

    #[test]
    fn test_open_rejects_non_pdf() {
        let result = QpdfDocument::open(b"not a pdf");
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }

    #[test]
    fn test_open_rejects_truncated_pdf() {
        let result = QpdfDocument::open(b"%PDF-1.4\n%garbage with no objects");
        assert!(result.is_err());
    }
}
