//! Group loose spans into lines and blocks.
//!
//! pdfium reports text as a flat list of text objects. The extractor expects
//! a block → line → span hierarchy, so spans are clustered here: a span joins
//! a line when its vertical centre is within 30 % of its font size of the
//! line's centre, and a new block starts when the gap above a line exceeds
//! that line's height.

use crate::model::{LayoutBlock, LayoutLine, LayoutSpan};

const LINE_TOLERANCE: f32 = 0.3;

/// Cluster spans into blocks of lines.
pub fn build_layout(mut spans: Vec<LayoutSpan>) -> Vec<LayoutBlock> {
    spans.sort_by(|a, b| {
        a.bbox
            .center_y()
            .total_cmp(&b.bbox.center_y())
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let lines = group_lines(spans);
    group_blocks(lines)
}

fn group_lines(spans: Vec<LayoutSpan>) -> Vec<LayoutLine> {
    let mut lines: Vec<LayoutLine> = Vec::new();

    for span in spans {
        let tolerance = span.size.max(1.0) * LINE_TOLERANCE;
        match lines.last_mut() {
            Some(line) if (span.bbox.center_y() - line.bbox.center_y()).abs() <= tolerance => {
                line.bbox = line.bbox.union(&span.bbox);
                line.spans.push(span);
            }
            _ => lines.push(LayoutLine {
                bbox: span.bbox,
                spans: vec![span],
            }),
        }
    }

    for line in &mut lines {
        line.spans.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    lines
}

fn group_blocks(lines: Vec<LayoutLine>) -> Vec<LayoutBlock> {
    let mut blocks: Vec<LayoutBlock> = Vec::new();

    for line in lines {
        match blocks.last_mut() {
            Some(block) if line.bbox.y0 - block.bbox.y1 <= line.bbox.height() => {
                block.bbox = block.bbox.union(&line.bbox);
                block.lines.push(line);
            }
            _ => blocks.push(LayoutBlock {
                bbox: line.bbox,
                lines: vec![line],
            }),
        }
    }

    blocks
}
