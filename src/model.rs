//! Value types shared by every pipeline stage.
//!
//! All coordinates are PDF points with a **top-left** origin: `y` grows
//! downward, so `y0` is the top edge of a rectangle. Rasters rendered at
//! scale `s` map back into this space by dividing pixel coordinates by `s`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Geometry ─────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in PDF points, top-left origin.
///
/// Invariant: `x0 <= x1` and `y0 <= y1`. [`Rect::new`] normalises swapped
/// corners so the invariant always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Whether `other` lies entirely within `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }

    /// Overlapping area of two rectangles, or `None` when they only touch or
    /// are disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x0.max(other.x0);
        let y0 = self.y0.max(other.y0);
        let x1 = self.x1.min(other.x1);
        let y1 = self.y1.min(other.y1);
        if x0 < x1 && y0 < y1 {
            Some(Rect { x0, y0, x1, y1 })
        } else {
            None
        }
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Divide every coordinate by `scale` (raster space → PDF space).
    pub fn unscale(&self, scale: f32) -> Rect {
        Rect::new(
            self.x0 / scale,
            self.y0 / scale,
            self.x1 / scale,
            self.y1 / scale,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.1}, {:.1}, {:.1}, {:.1})",
            self.x0, self.y0, self.x1, self.y1
        )
    }
}

// ── Highlight regions ────────────────────────────────────────────────────

/// How a region was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionOrigin {
    /// A native highlight annotation stored in the PDF.
    Annotation,
    /// A colored area found by raster mask and contour analysis.
    ColorDetected,
}

/// A rectangular area of a page that holds highlighted content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRegion {
    page: usize,
    rect: Rect,
    origin: RegionOrigin,
    y_position: f32,
}

impl HighlightRegion {
    pub fn new(page: usize, rect: Rect, origin: RegionOrigin) -> Self {
        Self {
            page,
            rect,
            origin,
            y_position: rect.y0,
        }
    }

    /// 0-indexed page number.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn origin(&self) -> RegionOrigin {
        self.origin
    }

    /// Sort key within a page: the top edge of the rectangle.
    pub fn y_position(&self) -> f32 {
        self.y_position
    }
}

/// Sort regions into canonical reading order: ascending page, then ascending
/// `y_position`. The sort is stable, so equal keys keep discovery order.
pub fn sort_regions(regions: &mut [HighlightRegion]) {
    regions.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then_with(|| a.y_position.total_cmp(&b.y_position))
    });
}

// ── Annotations ──────────────────────────────────────────────────────────

/// Annotation subtypes the detector distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationKind {
    Highlight,
    Underline,
    Squiggly,
    Text,
    Other,
}

/// A native page annotation, rectangle already in top-left PDF space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub rect: Rect,
}

// ── Text layout ──────────────────────────────────────────────────────────

/// Font style bitmask attached to a span by the text-layout provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleFlags(pub u32);

impl StyleFlags {
    pub const ITALIC: u32 = 1;
    pub const BOLD: u32 = 2;

    pub fn is_italic(self) -> bool {
        self.0 & Self::ITALIC != 0
    }

    pub fn is_bold(self) -> bool {
        self.0 & Self::BOLD != 0
    }
}

/// One run of text sharing a single font, as reported by the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpan {
    pub text: String,
    pub font: String,
    pub size: f32,
    pub flags: StyleFlags,
    pub bbox: Rect,
}

/// A line of spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLine {
    pub bbox: Rect,
    pub spans: Vec<LayoutSpan>,
}

/// A block of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub bbox: Rect,
    pub lines: Vec<LayoutLine>,
}

// ── Extracted text ───────────────────────────────────────────────────────

/// A non-empty, trimmed span in reading order within its region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub font: String,
    pub size: f32,
    pub flags: StyleFlags,
    /// Only meaningful while sorting inside a region.
    pub bbox: Rect,
}

/// A span's text with its derived typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedBlock {
    pub text: String,
    pub is_header: bool,
    /// 0 means "not a header"; 1..=3 otherwise.
    pub header_level: u8,
    pub is_bold: bool,
    pub is_italic: bool,
}

impl FormattedBlock {
    /// The `(is_header, header_level)` pair that decides paragraph breaks.
    pub fn signature(&self) -> FormatSignature {
        FormatSignature {
            is_header: self.is_header,
            header_level: self.header_level,
        }
    }
}

/// Formatting signature shared by every block of a [`Paragraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSignature {
    pub is_header: bool,
    pub header_level: u8,
}

/// A maximal run of blocks sharing one [`FormatSignature`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub signature: FormatSignature,
    pub blocks: Vec<FormattedBlock>,
}

impl Paragraph {
    pub fn is_header(&self) -> bool {
        self.signature.is_header
    }

    pub fn header_level(&self) -> u8 {
        self.signature.header_level
    }
}
