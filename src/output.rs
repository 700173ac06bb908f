//! Result types returned by the extraction entry points.

use crate::config::OutputFormat;
use crate::error::Diagnostic;
use crate::model::{HighlightRegion, Paragraph};
use serde::{Deserialize, Serialize};

/// Everything one extraction run produced.
///
/// `content` is the rendered string. An empty `content` with no
/// `diagnostics` means the document simply has no highlights; check
/// `diagnostics` to see which pages or regions were skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub content: String,
    pub format: OutputFormat,
    /// Regions in canonical reading order.
    pub regions: Vec<HighlightRegion>,
    pub paragraphs: Vec<Paragraph>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// Trimmed, non-empty lines of `content`.
    pub fn sample_highlights(&self) -> Vec<String> {
        sample_lines(&self.content)
    }

    /// True when at least one page or region was skipped.
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub pages_scanned: usize,
    pub annotation_regions: usize,
    pub color_regions: usize,
    /// Regions that went on to text extraction.
    pub regions: usize,
    /// Regions that contributed at least one paragraph.
    pub regions_with_text: usize,
    pub spans: usize,
    pub paragraphs: usize,
    pub duration_ms: u64,
}

/// Formatted Markdown plus its non-empty lines, for keyword tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightSummary {
    pub formatted_text: String,
    pub sample_highlights: Vec<String>,
}

pub(crate) fn sample_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
