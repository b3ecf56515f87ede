//! Page-range extraction engine
//!
//! Takes a validated request, resolves the range against the real page
//! count, extracts per-page text and optionally saves the selected pages as
//! a new PDF.

use crate::error::{Error, Result};
use crate::pdf::{PdfBackend, PdfDocumentHandle};
use crate::request::{output_parent, validate, ExtractPagesParams, ExtractionRequest, PageRange};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Outcome of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// One entry per extracted page, in page order
    pub text: Vec<String>,
    /// Range actually extracted, after clamping to the document
    pub pages_extracted: PageRange,
    /// Page count of the source document
    pub total_pages: u32,
    /// Where the subset PDF was written, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

impl ExtractionResult {
    /// Whether the requested end page was cut back to the document length
    pub fn was_clamped(&self, requested: PageRange) -> bool {
        self.pages_extracted != requested
    }
}

/// Validate raw arguments, then extract. Nothing is opened when validation
/// fails.
pub fn extract_pages<B: PdfBackend>(
    backend: &B,
    params: &ExtractPagesParams,
    resource_dirs: &[String],
) -> Result<ExtractionResult> {
    let request = validate(params, resource_dirs)?;
    extract(backend, request)
}

/// Run a validated extraction request.
///
/// Open, page-count and range failures abort the call. If saving was
/// requested and fails, the whole call fails with an output error and the
/// extracted text is discarded.
pub fn extract<B: PdfBackend>(backend: &B, request: ExtractionRequest) -> Result<ExtractionResult> {
    let requested = request.range();
    tracing::info!(
        path = %request.file_path().display(),
        pages = %requested,
        save_as_pdf = request.save_as_pdf(),
        "Extracting pages"
    );

    let document = backend.open(request.file_path())?;
    let total_pages = document.page_count();
    let range = requested.clamp_to(total_pages)?;
    if range != requested {
        tracing::debug!(requested = %requested, resolved = %range, total_pages, "Clamped page range");
    }

    let text = document.pages_text(range)?;
    if text.len() != range.page_count() as usize {
        return Err(Error::Pdfium {
            reason: format!(
                "expected text for {} pages, got {}",
                range.page_count(),
                text.len()
            ),
        });
    }

    let output_path = match request.output_path() {
        Some(path) => {
            let data = document.copy_pages(range).map_err(|e| Error::OutputWrite {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            write_atomically(path, &data)?;
            tracing::info!(path = %path.display(), pages = %range, bytes = data.len(), "Wrote subset PDF");
            Some(path.to_path_buf())
        }
        None => None,
    };

    Ok(ExtractionResult {
        text,
        pages_extracted: range,
        total_pages,
        output_path,
    })
}

/// Write `data` to `path` so that readers see either the old file or the
/// complete new one.
///
/// The bytes go to a temporary file in the destination directory which is
/// synced and renamed over `path`. The temporary file is removed on any
/// failure.
fn write_atomically(path: &Path, data: &[u8]) -> Result<()> {
    let write_error = |reason: String| Error::OutputWrite {
        path: path.to_path_buf(),
        reason,
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".pdf-pages-")
        .suffix(".tmp")
        .tempfile_in(output_parent(path))
        .map_err(|e| write_error(format!("cannot create temporary file: {}", e)))?;

    temp.write_all(data)
        .map_err(|e| write_error(e.to_string()))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| write_error(e.to_string()))?;

    temp.persist(path)
        .map_err(|e| write_error(e.error.to_string()))?;
    Ok(())
}
