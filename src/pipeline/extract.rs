//! Text extraction: pull the styled spans inside one highlight region.
//!
//! The document's block → line → span structure is re-sorted at every level
//! before use, because providers disagree about (and sometimes scramble)
//! content-stream order: blocks and lines by their top edge, spans within a
//! line by their left edge.

use crate::config::HeadingThresholds;
use crate::document::Document;
use crate::error::RegionError;
use crate::model::{FormattedBlock, HighlightRegion, LayoutSpan, TextSpan};
use tracing::debug;

/// Spans inside `region`, in reading order, with blank spans dropped.
pub fn extract_spans(
    doc: &dyn Document,
    region: &HighlightRegion,
) -> Result<Vec<TextSpan>, RegionError> {
    let mut blocks = doc.text_layout(region.page(), &region.rect())?;
    blocks.sort_by(|a, b| a.bbox.y0.total_cmp(&b.bbox.y0));

    let mut spans = Vec::new();
    for block in blocks {
        let mut lines = block.lines;
        lines.sort_by(|a, b| a.bbox.y0.total_cmp(&b.bbox.y0));

        for line in lines {
            let mut line_spans = line.spans;
            line_spans.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            spans.extend(line_spans.into_iter().filter_map(into_text_span));
        }
    }

    debug!(
        "Page {} region {}: {} spans",
        region.page(),
        region.rect(),
        spans.len()
    );
    Ok(spans)
}

/// Extract and classify in one step.
pub fn extract_blocks(
    doc: &dyn Document,
    region: &HighlightRegion,
    headings: &HeadingThresholds,
) -> Result<Vec<FormattedBlock>, RegionError> {
    Ok(extract_spans(doc, region)?
        .iter()
        .map(|span| classify(span, headings))
        .collect())
}

fn into_text_span(span: LayoutSpan) -> Option<TextSpan> {
    let text = span.text.trim();
    if text.is_empty() {
        return None;
    }
    Some(TextSpan {
        text: text.to_string(),
        font: span.font,
        size: span.size,
        flags: span.flags,
        bbox: span.bbox,
    })
}

/// Derive bold/italic/header attributes for one span.
///
/// Bold and italic come from either the font name or the style flags.
/// Header level comes only from the font-size ratio against the baseline.
pub fn classify(span: &TextSpan, headings: &HeadingThresholds) -> FormattedBlock {
    let font = span.font.to_lowercase();
    let is_bold = font.contains("bold") || span.flags.is_bold();
    let is_italic = font.contains("italic") || font.contains("oblique") || span.flags.is_italic();
    let header_level = headings.level_for(span.size);

    FormattedBlock {
        text: span.text.clone(),
        is_header: header_level > 0,
        header_level,
        is_bold,
        is_italic,
    }
}
