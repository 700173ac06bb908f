//! # pdf-highlights
//!
//! Extract the passages a reader highlighted in a PDF and render them as
//! Markdown or HTML, keeping headers, bold and italic.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Detect    highlight annotations; if none, yellow-ish pixel areas
//!  ├─ 2. Sort      regions by (page, top edge)
//!  ├─ 3. Extract   styled text spans clipped to each region
//!  ├─ 4. Assemble  consecutive spans with the same header level → paragraphs
//!  └─ 5. Render    Markdown or HTML string (+ optional file)
//! ```
//!
//! Native highlight annotations win: when a document has any, pages are
//! never rasterised. Otherwise every page is rendered once and areas close
//! to the target color become regions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_highlights::{extract_highlights, ExtractionConfig, OutputFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .format(OutputFormat::Markdown)
//!         .build()?;
//!     let output = extract_highlights("paper.pdf", &config)?;
//!     println!("{}", output.content);
//!     for diagnostic in &output.diagnostics {
//!         eprintln!("skipped: {}", diagnostic);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-highlights` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf-highlights = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! The backend binds pdfium at runtime: `PDFIUM_LIB_PATH` if set, then the
//! working directory, then the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ExtractionConfig, ExtractionConfigBuilder, HeadingThresholds, HighlightColor, OutputFormat,
    PageSelection,
};
pub use convert::{
    extract_and_format, extract_from_document, extract_highlights, extract_highlights_async,
    extract_sample_highlights, persist,
};
pub use document::Document;
pub use error::{Diagnostic, HighlightError, PageError, RegionError};
pub use model::{
    Annotation, AnnotationKind, FormattedBlock, HighlightRegion, LayoutBlock, LayoutLine,
    LayoutSpan, Paragraph, Rect, RegionOrigin, StyleFlags, TextSpan,
};
pub use output::{ExtractionOutput, ExtractionStats, HighlightSummary};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
