//! Integration tests for the PDF pages MCP server
//!
//! Fixtures are generated on the fly: each page carries one marker word in
//! Helvetica. Tests that read page text need a PDFium library and are
//! ignored by default; run them with `cargo test -- --ignored`.

use pdf_pages_mcp::pdf::{NativeBackend, PdfBackend, PdfDocumentHandle, QpdfDocument};
use pdf_pages_mcp::{extract_pages, ErrorKind, ExtractPagesParams, PageRange};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use std::path::{Path, PathBuf};

fn marker(page: u32) -> String {
    format!("Marker{}", page)
}

/// Build a minimal PDF with one Helvetica line per page
fn build_pdf(pages: &[String]) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    for (i, text) in pages.iter().enumerate() {
        let escaped = text
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        let content = format!("BT /F1 24 Tf 72 720 Td ({}) Tj ET", escaped);
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

fn write_fixture(dir: &tempfile::TempDir, name: &str, page_count: u32) -> PathBuf {
    let pages: Vec<String> = (1..=page_count).map(marker).collect();
    let path = dir.path().join(name);
    std::fs::write(&path, build_pdf(&pages)).expect("Failed to write fixture");
    path
}

fn args(path: &Path, start: u32, end: u32) -> ExtractPagesParams {
    serde_json::from_value(json!({
        "file_path": path.to_string_lossy(),
        "start_page": start,
        "end_page": end
    }))
    .unwrap()
}

fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

// ============================================================================
// Document structure (qpdf only)
// ============================================================================

#[test]
fn test_open_generated_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "ten.pdf", 10);

    let document = NativeBackend.open(&path).expect("Failed to open fixture");
    assert_eq!(document.page_count(), 10);
}

#[test]
fn test_open_empty_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "empty.pdf", 0);

    let document = NativeBackend.open(&path).expect("Failed to open fixture");
    assert_eq!(document.page_count(), 0);
}

#[test]
fn test_copy_pages_page_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "ten.pdf", 10);
    let document = NativeBackend.open(&path).unwrap();

    let subset = document.copy_pages(PageRange::new(3, 5).unwrap()).unwrap();
    assert!(subset.starts_with(b"%PDF"));
    let reopened = QpdfDocument::open(&subset).unwrap();
    assert_eq!(reopened.page_count(), 3);
}

#[test]
fn test_copy_single_page() {
    let data = build_pdf(&(1..=4).map(marker).collect::<Vec<_>>());
    let document = QpdfDocument::open(&data).unwrap();

    let subset = document.copy_pages(PageRange::new(4, 4).unwrap()).unwrap();
    assert_eq!(QpdfDocument::open(&subset).unwrap().page_count(), 1);
}

/// Decoded content stream of every page, in document order
fn page_contents(data: &[u8]) -> Vec<String> {
    let pdf = qpdf::QPdf::read_from_memory(data).expect("Failed to reopen subset");
    let count = pdf.get_num_pages().unwrap();
    (0..count)
        .map(|index| {
            let page = pdf.get_page(index).unwrap();
            let content = page.get_page_content_data().unwrap();
            String::from_utf8_lossy(&content[..]).to_string()
        })
        .collect()
}

#[rstest]
#[case(3, 5)]
#[case(1, 1)]
#[case(8, 10)]
#[case(1, 10)]
fn test_copy_pages_keeps_order(#[case] start: u32, #[case] end: u32) {
    let data = build_pdf(&(1..=10).map(marker).collect::<Vec<_>>());
    let document = QpdfDocument::open(&data).unwrap();

    let subset = document.copy_pages(PageRange::new(start, end).unwrap()).unwrap();
    let contents = page_contents(&subset);

    assert_eq!(contents.len() as u32, end - start + 1);
    for (offset, content) in contents.iter().enumerate() {
        let expected = format!("({})", marker(start + offset as u32));
        assert!(
            content.contains(&expected),
            "page {} of subset should hold {}, got {:?}",
            offset + 1,
            expected,
            content
        );
    }
}

// ============================================================================
// Error scenarios (no text extraction involved)
// ============================================================================

#[rstest]
#[case(1, 1)]
#[case(1, 20)]
#[case(3, 4)]
fn test_empty_document_error(#[case] start: u32, #[case] end: u32) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "empty.pdf", 0);

    let err = extract_pages(&NativeBackend, &args(&path, start, end), &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyDocumentError);
}

#[rstest]
#[case(15, 20)]
#[case(11, 11)]
fn test_range_beyond_document(#[case] start: u32, #[case] end: u32) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "ten.pdf", 10);

    let err = extract_pages(&NativeBackend, &args(&path, start, end), &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PageRangeOutOfBoundsError);
    assert_eq!(
        err.client_message(),
        format!(
            "Start page {} is beyond the end of the document (10 pages)",
            start
        )
    );
}

#[test]
fn test_nonexistent_file() {
    let err = extract_pages(
        &NativeBackend,
        &args(Path::new("/nonexistent/report.pdf"), 1, 3),
        &[],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[test]
fn test_not_a_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.pdf");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

    let err = extract_pages(&NativeBackend, &args(&path, 1, 1), &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DocumentOpenError);
}

#[test]
fn test_corrupt_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.pdf");
    std::fs::write(&path, b"%PDF-1.4\nthis is not a pdf body\n").unwrap();

    let err = extract_pages(&NativeBackend, &args(&path, 1, 1), &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DocumentOpenError);
}

#[test]
fn test_save_without_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "ten.pdf", 10);
    let params: ExtractPagesParams = serde_json::from_value(json!({
        "file_path": path.to_string_lossy(),
        "start_page": 1,
        "end_page": 2,
        "save_as_pdf": true
    }))
    .unwrap();

    let err = extract_pages(&NativeBackend, &params, &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

// ============================================================================
// Text extraction (needs PDFium)
// ============================================================================

#[test]
#[ignore = "requires PDFium"]
fn test_extract_within_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "ten.pdf", 10);

    let result = extract_pages(&NativeBackend, &args(&path, 3, 5), &[]).unwrap();
    assert_eq!(result.pages_extracted, PageRange::new(3, 5).unwrap());
    assert_eq!(result.total_pages, 10);
    let texts: Vec<String> = result.text.iter().map(|t| squash(t)).collect();
    assert_eq!(texts, vec![marker(3), marker(4), marker(5)]);
}

#[test]
#[ignore = "requires PDFium"]
fn test_extract_clamps_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "ten.pdf", 10);

    let result = extract_pages(&NativeBackend, &args(&path, 8, 20), &[]).unwrap();
    assert_eq!(result.pages_extracted, PageRange::new(8, 10).unwrap());
    assert_eq!(result.text.len(), 3);
    assert_eq!(squash(&result.text[2]), marker(10));
}

#[test]
#[ignore = "requires PDFium"]
fn test_extract_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "ten.pdf", 10);

    let first = extract_pages(&NativeBackend, &args(&path, 2, 6), &[]).unwrap();
    let second = extract_pages(&NativeBackend, &args(&path, 2, 6), &[]).unwrap();
    assert_eq!(first, second);
}

#[rstest]
#[case(2, 4)]
#[case(1, 1)]
#[case(7, 10)]
#[ignore = "requires PDFium"]
fn test_subset_round_trip(#[case] start: u32, #[case] end: u32) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "ten.pdf", 10);
    let output = dir.path().join("subset.pdf");

    let params: ExtractPagesParams = serde_json::from_value(json!({
        "file_path": path.to_string_lossy(),
        "start_page": start,
        "end_page": end,
        "save_as_pdf": true,
        "output_path": output.to_string_lossy()
    }))
    .unwrap();
    let saved = extract_pages(&NativeBackend, &params, &[]).unwrap();
    assert_eq!(saved.output_path.as_deref(), Some(output.as_path()));

    let count = end - start + 1;
    let reopened = extract_pages(&NativeBackend, &args(&output, 1, count), &[]).unwrap();
    assert_eq!(reopened.total_pages, count);
    assert_eq!(reopened.text, saved.text);

    let expected: Vec<String> = (start..=end).map(marker).collect();
    let actual: Vec<String> = reopened.text.iter().map(|t| squash(t)).collect();
    assert_eq!(actual, expected);
}

#[test]
#[ignore = "requires PDFium"]
fn test_subset_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "ten.pdf", 10);
    let output = dir.path().join("subset.pdf");

    let params: ExtractPagesParams = serde_json::from_value(json!({
        "file_path": path.to_string_lossy(),
        "start_page": 1,
        "end_page": 3,
        "save_pdf": true,
        "output_path": output.to_string_lossy()
    }))
    .unwrap();
    extract_pages(&NativeBackend, &params, &[]).unwrap();

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["subset.pdf".to_string(), "ten.pdf".to_string()]);
}
