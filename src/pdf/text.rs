//! Page text extraction with PDFium
//!
//! PDFium hands back characters in content-stream order, which for many
//! generators is not reading order. Characters are regrouped into lines by
//! their vertical position, lines are ordered top to bottom, and word and
//! paragraph breaks are inferred from gaps relative to the median glyph
//! height.

use crate::error::{Error, Result};
use crate::pdf::qpdf::check_signature;
use crate::request::PageRange;
use pdfium_render::prelude::*;
use std::cmp::Ordering;

/// Fallback thresholds when no glyph carries a usable height
const DEFAULT_LINE_TOLERANCE: f32 = 5.0;
const DEFAULT_WORD_GAP: f32 = 10.0;

/// A vertical gap this many line heights wide starts a new paragraph
const PARAGRAPH_GAP_FACTOR: f32 = 1.5;

/// Get a PDFium instance (a new one each time, PDFium is not thread-safe)
fn create_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Whether a PDFium library can be found. Text extraction fails without one.
pub fn pdfium_available() -> bool {
    create_pdfium().is_ok()
}

fn map_pdfium_error(err: PdfiumError) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::PasswordRequired
        }
        _ => Error::Pdfium {
            reason: format!("{}", err),
        },
    }
}

/// Extract text for every page in `range` from PDF bytes, in page order.
///
/// The document is loaded once for the whole range.
pub fn extract_pages_text(data: &[u8], range: PageRange) -> Result<Vec<String>> {
    check_signature(data)?;

    let pdfium = create_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(map_pdfium_error)?;
    let pages = document.pages();
    let page_count = pages.len() as u32;

    if range.end() > page_count {
        return Err(Error::PageRangeOutOfBounds {
            start: range.start(),
            total: page_count,
        });
    }

    let mut texts = Vec::with_capacity(range.page_count() as usize);
    for page_index in range.zero_based() {
        let index = pdfium_page_index(page_index)?;
        let page = pages.get(index).map_err(|e| Error::Pdfium {
            reason: format!("Failed to get page {}: {}", page_index + 1, e),
        })?;
        texts.push(page_text(&page));
    }

    Ok(texts)
}

/// PDFium addresses pages with a `u16`
fn pdfium_page_index(page_index: u32) -> Result<u16> {
    u16::try_from(page_index).map_err(|_| Error::Pdfium {
        reason: format!("page {} is beyond what PDFium can address", page_index + 1),
    })
}

/// A positioned character
#[derive(Debug, Clone, Copy)]
struct Glyph {
    ch: char,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Characters sharing a baseline
#[derive(Debug)]
struct Line {
    y: f32,
    height: f32,
    glyphs: Vec<Glyph>,
}

fn page_text(page: &PdfPage) -> String {
    // Pages without a text layer read as empty
    let Ok(text) = page.text() else {
        return String::new();
    };

    let mut glyphs = Vec::new();
    for segment in text.segments().iter() {
        let Ok(chars) = segment.chars() else {
            continue;
        };
        for char_result in chars.iter() {
            let Some(ch) = char_result.unicode_char() else {
                continue;
            };
            if let Ok(bounds) = char_result.loose_bounds() {
                glyphs.push(Glyph {
                    ch,
                    x: bounds.left().value,
                    y: bounds.top().value,
                    width: bounds.width().value,
                    height: bounds.height().value,
                });
            }
        }
    }

    layout_text(glyphs)
}

/// Line tolerance and word gap derived from the median glyph height
fn thresholds(glyphs: &[Glyph]) -> (f32, f32) {
    let mut heights: Vec<f32> = glyphs
        .iter()
        .map(|g| g.height)
        .filter(|h| *h > 0.0)
        .collect();
    if heights.is_empty() {
        return (DEFAULT_LINE_TOLERANCE, DEFAULT_WORD_GAP);
    }
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let median = heights[heights.len() / 2];

    ((median * 0.4).max(2.0), (median * 0.3).max(3.0))
}

fn group_lines(mut glyphs: Vec<Glyph>, tolerance: f32) -> Vec<Line> {
    // PDF y grows upwards: top of the page first
    glyphs.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines: Vec<Line> = Vec::new();
    for glyph in glyphs {
        match lines.last_mut() {
            Some(line) if (line.y - glyph.y).abs() <= tolerance => line.glyphs.push(glyph),
            _ => lines.push(Line {
                y: glyph.y,
                height: 0.0,
                glyphs: vec![glyph],
            }),
        }
    }

    for line in &mut lines {
        line.glyphs
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        line.height =
            line.glyphs.iter().map(|g| g.height).sum::<f32>() / line.glyphs.len() as f32;
    }
    lines
}

fn layout_text(glyphs: Vec<Glyph>) -> String {
    if glyphs.is_empty() {
        return String::new();
    }

    let (tolerance, word_gap) = thresholds(&glyphs);
    let lines = group_lines(glyphs, tolerance);

    let mut out = String::new();
    let mut previous: Option<&Line> = None;
    for line in &lines {
        if let Some(prev) = previous {
            let gap = prev.y - line.y;
            if gap > prev.height.max(line.height) * PARAGRAPH_GAP_FACTOR {
                out.push('\n');
            }
        }

        // Gaps are measured from the previous glyph's right edge
        let mut prev_right: Option<f32> = None;
        for glyph in &line.glyphs {
            if let Some(right) = prev_right {
                if glyph.x - right > word_gap && glyph.ch != ' ' {
                    out.push(' ');
                }
            }
            out.push(glyph.ch);
            prev_right = Some(glyph.x + glyph.width);
        }
        out.push('\n');
        previous = Some(line);
    }

    out.trim_end().to_string()
}
