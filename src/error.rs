//! Error types for the pdf-highlights library.
//!
//! Two tiers of failure exist, and they are kept in separate types:
//!
//! * [`HighlightError`] — **Fatal**: the run cannot produce output at all
//!   (document cannot be opened, unsupported output format, output file not
//!   writable). Returned as `Err(HighlightError)` from the top-level
//!   `extract*` functions.
//!
//! * [`PageError`] / [`RegionError`] — **Non-fatal**: one page failed to
//!   rasterise or list its annotations, or one region's text layout could not
//!   be read. The page or region contributes nothing and the run continues.
//!   Each one is recorded as a [`Diagnostic`] inside
//!   [`crate::output::ExtractionOutput`] so callers can tell a degraded run
//!   from a clean one.

use crate::model::Rect;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-highlights library.
#[derive(Debug, Error)]
pub enum HighlightError {
    // ── Document errors ───────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The requested output format is neither Markdown nor HTML.
    #[error("Unsupported output format '{format}' (expected 'markdown' or 'html')")]
    UnsupportedFormat { format: String },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, place the library next to the\n\
binary, or install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HighlightError {
    /// Whether the error means the document itself could not be opened.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            HighlightError::FileNotFound { .. }
                | HighlightError::PermissionDenied { .. }
                | HighlightError::NotAPdf { .. }
                | HighlightError::CorruptPdf { .. }
                | HighlightError::PasswordRequired { .. }
                | HighlightError::WrongPassword { .. }
        )
    }
}

/// A non-fatal error for a single page.
///
/// Page numbers are 0-indexed, matching [`crate::model::HighlightRegion::page`].
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PageError {
    /// Page rasterisation failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The page's annotation list could not be read.
    #[error("Page {page}: annotation query failed: {detail}")]
    AnnotationsFailed { page: usize, detail: String },

    /// A selected page does not exist in the document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    OutOfRange { page: usize, total: usize },

    /// A selected page range runs past the end of the document.
    #[error("Pages {first}-{last} are out of range (document has {total} pages)")]
    RangeOutOfRange {
        first: usize,
        last: usize,
        total: usize,
    },
}

/// A non-fatal error for a single highlight region.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum RegionError {
    /// The text-layout query for the region failed.
    #[error("Page {page}: text extraction failed for region {rect}: {detail}")]
    TextLayoutFailed {
        page: usize,
        rect: Rect,
        detail: String,
    },
}

/// A recovered failure recorded during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Diagnostic {
    Page(PageError),
    Region(RegionError),
}

impl From<PageError> for Diagnostic {
    fn from(e: PageError) -> Self {
        Diagnostic::Page(e)
    }
}

impl From<RegionError> for Diagnostic {
    fn from(e: RegionError) -> Self {
        Diagnostic::Region(e)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::Page(e) => e.fmt(f),
            Diagnostic::Region(e) => e.fmt(f),
        }
    }
}
