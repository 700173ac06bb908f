//! Highlight detection: find the rectangles a reader marked.
//!
//! Two strategies run in a fixed order:
//!
//! 1. **Annotations.** Native highlight annotations are authoritative. If any
//!    page yields at least one, their rectangles are the whole answer and no
//!    page is ever rasterised.
//! 2. **Color mask.** Only when the annotation pass finds nothing: each page
//!    is rendered once at `render_scale`, pixels close to the target color
//!    form a binary mask, and the outer contours of that mask (minus specks
//!    below `min_contour_area`) become regions after their bounding boxes are
//!    divided by the scale.
//!
//! A page that fails either step is skipped and recorded as a
//! [`Diagnostic`]; the other pages are unaffected.

use crate::config::{ExtractionConfig, HighlightColor};
use crate::document::Document;
use crate::error::{Diagnostic, PageError};
use crate::model::{AnnotationKind, HighlightRegion, Rect, RegionOrigin};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::point::Point;
use tracing::{debug, info, warn};

/// Result of the detection stage, in discovery order (not yet sorted).
#[derive(Debug, Default)]
pub struct Detection {
    pub regions: Vec<HighlightRegion>,
    pub diagnostics: Vec<Diagnostic>,
    /// Pages that exist and were selected for scanning.
    pub pages_scanned: usize,
    pub annotation_regions: usize,
    pub color_regions: usize,
}

/// Detect highlight regions on the selected pages of `doc`.
pub fn detect_highlights(doc: &dyn Document, config: &ExtractionConfig) -> Detection {
    let total = doc.page_count();
    let mut detection = Detection::default();

    if let Some((first, last)) = config.pages.range_overflow(total) {
        let err = PageError::RangeOutOfRange { first, last, total };
        warn!("{}", err);
        detection.diagnostics.push(err.into());
    }

    let mut pages = Vec::new();
    for page in config.pages.to_indices(total) {
        if page >= total {
            let err = PageError::OutOfRange { page, total };
            warn!("{}", err);
            detection.diagnostics.push(err.into());
        } else {
            pages.push(page);
        }
    }
    detection.pages_scanned = pages.len();
    info!("Scanning {} of {} pages for highlights", pages.len(), total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_detection_start(pages.len());
    }

    let annotated = detect_from_annotations(doc, &pages, config, &mut detection.diagnostics);
    if !annotated.is_empty() {
        info!("Found {} highlight annotations", annotated.len());
        detection.annotation_regions = annotated.len();
        detection.regions = annotated;
        return detection;
    }

    debug!("No highlight annotations; falling back to color detection");
    let colored = detect_from_color(doc, &pages, config, &mut detection.diagnostics);
    info!(
        "Found {} color-detected highlight areas (target {}, tolerance {})",
        colored.len(),
        config.target_color,
        config.tolerance
    );
    detection.color_regions = colored.len();
    detection.regions = colored;
    detection
}

/// Collect every highlight-type annotation on `pages`.
fn detect_from_annotations(
    doc: &dyn Document,
    pages: &[usize],
    config: &ExtractionConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<HighlightRegion> {
    let mut regions = Vec::new();

    for &page in pages {
        let annotations = match doc.annotations(page) {
            Ok(a) => a,
            Err(e) => {
                warn!("Skipping annotations of page {}: {}", page, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page + 1, &e.to_string());
                }
                diagnostics.push(e.into());
                continue;
            }
        };

        let before = regions.len();
        regions.extend(
            annotations
                .iter()
                .filter(|a| a.kind == AnnotationKind::Highlight)
                .map(|a| HighlightRegion::new(page, a.rect, RegionOrigin::Annotation)),
        );
        debug!(
            "Page {}: {} annotations, {} highlights",
            page,
            annotations.len(),
            regions.len() - before
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_scanned(page + 1, regions.len() - before);
        }
    }

    regions
}

/// Rasterise each page once and turn target-colored areas into regions.
fn detect_from_color(
    doc: &dyn Document,
    pages: &[usize],
    config: &ExtractionConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<HighlightRegion> {
    let mut regions = Vec::new();

    for &page in pages {
        let raster = match doc.render_page(page, config.render_scale) {
            Ok(img) => img,
            Err(e) => {
                warn!("Skipping color detection on page {}: {}", page, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page + 1, &e.to_string());
                }
                diagnostics.push(e.into());
                continue;
            }
        };

        let mask = color_mask(&raster, config.target_color, config.tolerance);
        let boxes = find_highlight_boxes(&mask, config.min_contour_area);
        debug!(
            "Page {}: {}x{} px raster, {} highlight areas",
            page,
            raster.width(),
            raster.height(),
            boxes.len()
        );

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_scanned(page + 1, boxes.len());
        }

        regions.extend(boxes.into_iter().map(|b| {
            HighlightRegion::new(page, b.unscale(config.render_scale), RegionOrigin::ColorDetected)
        }));
    }

    regions
}

/// Binary mask: 255 where a pixel is within `tolerance` of `color`.
pub fn color_mask(image: &RgbImage, color: HighlightColor, tolerance: u32) -> GrayImage {
    let mut mask = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        if color.is_similar(pixel.0, tolerance) {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

/// Raster-space bounding boxes of the mask's outermost contours whose
/// polygon area reaches `min_area`.
///
/// Contours nested inside a hole of another contour are ignored. Boxes span
/// whole pixels: a contour touching columns 10..=29 yields `x0 = 10`,
/// `x1 = 30`.
pub fn find_highlight_boxes(mask: &GrayImage, min_area: f64) -> Vec<Rect> {
    let contours: Vec<Contour<i32>> = find_contours(mask);

    contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let area = contour_area(&c.points);
            if area < min_area {
                return None;
            }
            bounding_box(&c.points)
        })
        .collect()
}

/// Shoelace area of a closed contour through pixel centres.
fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    (twice as f64 / 2.0).abs()
}

fn bounding_box(points: &[Point<i32>]) -> Option<Rect> {
    let min_x = points.iter().map(|p| p.x).min()?;
    let max_x = points.iter().map(|p| p.x).max()?;
    let min_y = points.iter().map(|p| p.y).min()?;
    let max_y = points.iter().map(|p| p.y).max()?;
    Some(Rect::new(
        min_x as f32,
        min_y as f32,
        (max_x + 1) as f32,
        (max_y + 1) as f32,
    ))
}
