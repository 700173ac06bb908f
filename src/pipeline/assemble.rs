//! Paragraph assembly: split a region's blocks into formatting runs.

use crate::model::{FormattedBlock, Paragraph};

/// Group consecutive blocks that share `(is_header, header_level)`.
///
/// A change of signature closes the current run. Bold and italic never
/// break a run; they are rendered per block.
pub fn assemble(blocks: Vec<FormattedBlock>) -> Vec<Paragraph> {
    let mut paragraphs: Vec<Paragraph> = Vec::new();

    for block in blocks {
        let signature = block.signature();
        match paragraphs.last_mut() {
            Some(current) if current.signature == signature => current.blocks.push(block),
            _ => paragraphs.push(Paragraph {
                signature,
                blocks: vec![block],
            }),
        }
    }

    paragraphs
}
