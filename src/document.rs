//! The document-access seam.
//!
//! The pipeline never touches pdfium directly; it talks to a [`Document`].
//! [`crate::pipeline::pdfium::PdfiumDocument`] is the production
//! implementation, and tests supply in-memory documents.
//!
//! Every coordinate crossing this trait is in PDF points with a top-left
//! origin (see [`crate::model`]).

use crate::error::{PageError, RegionError};
use crate::model::{Annotation, LayoutBlock, Rect};
use image::RgbImage;

/// Read access to an open PDF document.
///
/// Page indices are 0-based. Implementations own whatever handle they need
/// and release it on drop.
pub trait Document {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Rasterise a page at `scale` × its size in points.
    fn render_page(&self, page: usize, scale: f32) -> Result<RgbImage, PageError>;

    /// All annotations on a page, any kind.
    fn annotations(&self, page: usize) -> Result<Vec<Annotation>, PageError>;

    /// Structured text on `page` restricted to `clip`.
    ///
    /// The returned blocks, lines and spans may come in any order; callers
    /// re-sort them.
    fn text_layout(&self, page: usize, clip: &Rect) -> Result<Vec<LayoutBlock>, RegionError>;
}
