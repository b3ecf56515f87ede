//! Tool argument validation
//!
//! Raw arguments arrive from the transport as loosely typed JSON. Everything
//! that can be checked without opening the document happens here, once, so
//! the extraction engine only deals with document-dependent failures.

use crate::error::{Error, Result};
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Raw `extract_pages` arguments as delivered by the transport.
///
/// Fields are kept as untyped JSON so that a wrong type is reported as a
/// structured validation error instead of a protocol-level failure. The
/// advertised schema still carries the intended types.
#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
pub struct ExtractPagesParams {
    /// Path to the PDF file
    #[serde(default)]
    #[schemars(with = "String")]
    pub file_path: Option<Value>,
    /// First page to extract (1-indexed, inclusive)
    #[serde(default)]
    #[schemars(with = "u32")]
    pub start_page: Option<Value>,
    /// Last page to extract (1-indexed, inclusive). Clamped to the last page
    /// of the document when it runs past the end.
    #[serde(default)]
    #[schemars(with = "u32")]
    pub end_page: Option<Value>,
    /// Also save the selected pages as a new PDF at `output_path` (default: false)
    #[serde(default, alias = "save_pdf")]
    #[schemars(with = "bool")]
    pub save_as_pdf: Option<Value>,
    /// Destination of the new PDF. Required when `save_as_pdf` is true; its
    /// directory must already exist.
    #[serde(default)]
    #[schemars(with = "String")]
    pub output_path: Option<Value>,
}

/// 1-based inclusive page range with `1 <= start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start == 0 {
            return Err(Error::invalid("start_page", "must be a positive integer"));
        }
        if start > end {
            return Err(Error::invalid(
                "end_page",
                format!(
                    "must be greater than or equal to start_page (got {} < {})",
                    end, start
                ),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages in the range
    pub fn page_count(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Page numbers in ascending order
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    /// 0-indexed page indices in ascending order
    pub fn zero_based(&self) -> impl Iterator<Item = u32> {
        (self.start - 1)..self.end
    }

    /// Resolve this range against a document with `total_pages` pages.
    ///
    /// An end past the last page is clamped; a start past the last page is
    /// an error because nothing overlaps.
    pub fn clamp_to(&self, total_pages: u32) -> Result<PageRange> {
        if total_pages == 0 {
            return Err(Error::EmptyDocument);
        }
        if self.start > total_pages {
            return Err(Error::PageRangeOutOfBounds {
                start: self.start,
                total: total_pages,
            });
        }
        Ok(PageRange {
            start: self.start,
            end: self.end.min(total_pages),
        })
    }
}

/// Serialized as `[start, end]`
impl Serialize for PageRange {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (self.start, self.end).serialize(serializer)
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A validated extraction request. Built only by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    file_path: PathBuf,
    range: PageRange,
    output_path: Option<PathBuf>,
}

impl ExtractionRequest {
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn range(&self) -> PageRange {
        self.range
    }

    pub fn save_as_pdf(&self) -> bool {
        self.output_path.is_some()
    }

    /// Destination of the subset PDF, present iff saving was requested
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }
}

/// Validate raw tool arguments into an [`ExtractionRequest`].
///
/// `resource_dirs` restricts both the source and the output path; when empty
/// every path is allowed. The source is never read; the output directory
/// gets a throwaway anonymous file to confirm it is writable.
pub fn validate(params: &ExtractPagesParams, resource_dirs: &[String]) -> Result<ExtractionRequest> {
    let file_path = required_string("file_path", params.file_path.as_ref())?;
    let file_path = PathBuf::from(file_path);
    validate_path_access(&file_path, resource_dirs)?;
    if !file_path.is_file() {
        return Err(Error::invalid(
            "file_path",
            format!("file '{}' does not exist", file_path.display()),
        ));
    }

    let start = page_number("start_page", params.start_page.as_ref())?;
    let end = page_number("end_page", params.end_page.as_ref())?;
    let range = PageRange::new(start, end)?;

    let save_as_pdf = match params.save_as_pdf.as_ref() {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(Error::invalid(
                "save_as_pdf",
                format!("expected a boolean, got {}", json_type(other)),
            ))
        }
    };

    let output_path = if save_as_pdf {
        let output = required_string("output_path", params.output_path.as_ref())?;
        let output = PathBuf::from(output);
        validate_output_path_access(&output, resource_dirs)?;
        validate_output_location(&output, &file_path)?;
        Some(output)
    } else {
        None
    };

    Ok(ExtractionRequest {
        file_path,
        range,
        output_path,
    })
}

fn required_string<'a>(field: &'static str, value: Option<&'a Value>) -> Result<&'a str> {
    match value {
        None => Err(Error::invalid(field, "is required")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(Error::invalid(field, "cannot be empty or whitespace only"))
        }
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(Error::invalid(
            field,
            format!("expected a string, got {}", json_type(other)),
        )),
    }
}

fn page_number(field: &'static str, value: Option<&Value>) -> Result<u32> {
    let value = value.ok_or_else(|| Error::invalid(field, "is required"))?;
    let number = match value {
        Value::Number(n) => n,
        other => {
            return Err(Error::invalid(
                field,
                format!("expected an integer, got {}", json_type(other)),
            ))
        }
    };

    if let Some(page) = number.as_u64() {
        if page == 0 {
            return Err(Error::invalid(field, "must be a positive integer"));
        }
        return u32::try_from(page)
            .map_err(|_| Error::invalid(field, format!("{} is too large", page)));
    }
    if number.is_i64() {
        return Err(Error::invalid(field, "must be a positive integer"));
    }
    Err(Error::invalid(
        field,
        format!("expected an integer, got {}", number),
    ))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Directory the output file will be created in
pub(crate) fn output_parent(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn validate_output_location(output: &Path, source: &Path) -> Result<()> {
    if output.is_dir() {
        return Err(Error::invalid(
            "output_path",
            format!("'{}' is a directory", output.display()),
        ));
    }

    let parent = output_parent(output);
    let metadata = std::fs::metadata(parent).map_err(|_| {
        Error::invalid(
            "output_path",
            format!("directory '{}' does not exist", parent.display()),
        )
    })?;
    if !metadata.is_dir() {
        return Err(Error::invalid(
            "output_path",
            format!("'{}' is not a directory", parent.display()),
        ));
    }
    if !directory_writable(parent) {
        return Err(Error::invalid(
            "output_path",
            format!("directory '{}' is not writable", parent.display()),
        ));
    }

    if output.exists() {
        let same_file = match (std::fs::canonicalize(output), std::fs::canonicalize(source)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if same_file {
            return Err(Error::invalid(
                "output_path",
                "must differ from file_path; the source PDF is never overwritten",
            ));
        }
    }

    Ok(())
}

/// Whether this process can create files in `dir`.
///
/// Permission bits alone do not answer this (ownership, root, read-only
/// mounts), so an anonymous temporary file is created and dropped.
fn directory_writable(dir: &Path) -> bool {
    tempfile::tempfile_in(dir).is_ok()
}

/// Validate that a path is within allowed resource directories.
/// If no resource_dirs are configured, all paths are allowed.
fn validate_path_access(path: &Path, resource_dirs: &[String]) -> Result<()> {
    if resource_dirs.is_empty() {
        return Ok(());
    }

    let canonical = std::fs::canonicalize(path).map_err(|_| Error::PathAccessDenied {
        path: path.display().to_string(),
    })?;

    if within_resource_dirs(&canonical, resource_dirs) {
        Ok(())
    } else {
        Err(Error::PathAccessDenied {
            path: path.display().to_string(),
        })
    }
}

/// Validate that an output path is within allowed resource directories.
/// Canonicalizes the parent directory since the output file may not exist yet.
fn validate_output_path_access(path: &Path, resource_dirs: &[String]) -> Result<()> {
    if resource_dirs.is_empty() {
        return Ok(());
    }

    let denied = || Error::PathAccessDenied {
        path: path.display().to_string(),
    };

    let canonical_parent = std::fs::canonicalize(output_parent(path)).map_err(|_| denied())?;
    let file_name = path.file_name().ok_or_else(denied)?;
    let canonical_target = canonical_parent.join(file_name);

    if within_resource_dirs(&canonical_target, resource_dirs) {
        Ok(())
    } else {
        Err(denied())
    }
}

fn within_resource_dirs(canonical: &Path, resource_dirs: &[String]) -> bool {
    resource_dirs.iter().any(|dir| {
        std::fs::canonicalize(dir)
            .map(|canonical_dir| canonical.starts_with(&canonical_dir))
            .unwrap_or(false)
    })
}
