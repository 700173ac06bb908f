//! Whole-pipeline tests against an in-memory document.
//!
//! No pdfium is needed: `FakeDocument` serves annotations, rasters and text
//! layout straight from vectors, and counts how often pages are rendered.

use image::{Rgb, RgbImage};
use pdf_highlights::pipeline::layout::build_layout;
use pdf_highlights::{
    extract_from_document, extract_highlights_async, persist, Annotation, AnnotationKind,
    Diagnostic, Document, ExtractionConfig, ExtractionProgressCallback, HighlightError,
    LayoutBlock, LayoutSpan, OutputFormat, PageError, PageSelection, Rect, RegionError,
    RegionOrigin, StyleFlags,
};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test document ────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakePage {
    annotations: Vec<Annotation>,
    spans: Vec<LayoutSpan>,
    raster: Option<RgbImage>,
    fail_annotations: bool,
    fail_render: bool,
    fail_text: bool,
}

struct FakeDocument {
    pages: Vec<FakePage>,
    renders: Cell<usize>,
}

impl FakeDocument {
    fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            renders: Cell::new(0),
        }
    }
}

impl Document for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(&self, page: usize, scale: f32) -> Result<RgbImage, PageError> {
        self.renders.set(self.renders.get() + 1);
        let p = &self.pages[page];
        if p.fail_render {
            return Err(PageError::RenderFailed {
                page,
                detail: "bitmap allocation failed".into(),
            });
        }
        let side = (300.0 * scale) as u32;
        Ok(p
            .raster
            .clone()
            .unwrap_or_else(|| RgbImage::from_pixel(side, side, Rgb([255, 255, 255]))))
    }

    fn annotations(&self, page: usize) -> Result<Vec<Annotation>, PageError> {
        let p = &self.pages[page];
        if p.fail_annotations {
            return Err(PageError::AnnotationsFailed {
                page,
                detail: "malformed /Annots array".into(),
            });
        }
        Ok(p.annotations.clone())
    }

    fn text_layout(&self, page: usize, clip: &Rect) -> Result<Vec<LayoutBlock>, RegionError> {
        let p = &self.pages[page];
        if p.fail_text {
            return Err(RegionError::TextLayoutFailed {
                page,
                rect: *clip,
                detail: "text page unavailable".into(),
            });
        }
        let visible = p
            .spans
            .iter()
            .filter(|s| s.bbox.intersection(clip).is_some())
            .cloned()
            .collect();
        Ok(build_layout(visible))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn highlight(x0: f32, y0: f32, x1: f32, y1: f32) -> Annotation {
    Annotation {
        kind: AnnotationKind::Highlight,
        rect: Rect::new(x0, y0, x1, y1),
    }
}

fn span(text: &str, font: &str, size: f32, x0: f32, y0: f32) -> LayoutSpan {
    LayoutSpan {
        text: text.into(),
        font: font.into(),
        size,
        flags: StyleFlags::default(),
        bbox: Rect::new(x0, y0, x0 + 6.0 * text.len() as f32, y0 + size),
    }
}

fn body(text: &str, x0: f32, y0: f32) -> LayoutSpan {
    span(text, "Times-Roman", 11.0, x0, y0)
}

fn markdown() -> ExtractionConfig {
    ExtractionConfig::default()
}

fn html_fragment() -> ExtractionConfig {
    ExtractionConfig::builder()
        .format(OutputFormat::Html)
        .html_document(false)
        .build()
        .unwrap()
}

fn fill(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]) {
    for yy in y..y + h {
        for xx in x..x + w {
            img.put_pixel(xx, yy, Rgb(rgb));
        }
    }
}

// ── Detection ────────────────────────────────────────────────────────────────

#[test]
fn annotations_win_and_pages_are_never_rendered() {
    let doc = FakeDocument::new(vec![
        FakePage {
            annotations: vec![
                highlight(50.0, 100.0, 250.0, 115.0),
                Annotation {
                    kind: AnnotationKind::Underline,
                    rect: Rect::new(50.0, 200.0, 250.0, 215.0),
                },
            ],
            spans: vec![body("first page", 52.0, 102.0), body("underlined", 52.0, 202.0)],
            ..Default::default()
        },
        FakePage {
            annotations: vec![highlight(50.0, 40.0, 250.0, 55.0)],
            spans: vec![body("second page", 52.0, 42.0)],
            ..Default::default()
        },
    ]);

    let out = extract_from_document(&doc, &markdown());

    assert_eq!(doc.renders.get(), 0);
    assert_eq!(out.regions.len(), 2);
    assert!(out
        .regions
        .iter()
        .all(|r| r.origin() == RegionOrigin::Annotation));
    assert_eq!(out.content, "first page\n\nsecond page");
    assert_eq!(out.stats.annotation_regions, 2);
    assert_eq!(out.stats.color_regions, 0);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn regions_follow_page_then_top_edge() {
    let doc = FakeDocument::new(vec![
        FakePage {
            annotations: vec![
                highlight(50.0, 400.0, 250.0, 415.0),
                highlight(50.0, 100.0, 250.0, 115.0),
            ],
            spans: vec![body("lower", 52.0, 402.0), body("upper", 52.0, 102.0)],
            ..Default::default()
        },
        FakePage {
            annotations: vec![highlight(50.0, 10.0, 250.0, 25.0)],
            spans: vec![body("next page", 52.0, 12.0)],
            ..Default::default()
        },
    ]);

    let out = extract_from_document(&doc, &markdown());

    let keys: Vec<(usize, f32)> = out
        .regions
        .iter()
        .map(|r| (r.page(), r.y_position()))
        .collect();
    assert_eq!(keys, vec![(0, 100.0), (0, 400.0), (1, 10.0)]);
    assert_eq!(out.sample_highlights(), vec!["upper", "lower", "next page"]);
}

#[test]
fn color_fallback_finds_yellow_area() {
    // 30x12 px yellow block at (40, 20) in a scale-2 raster → (20, 10)-(35, 16) in points.
    let mut raster = RgbImage::from_pixel(600, 600, Rgb([255, 255, 255]));
    fill(&mut raster, 40, 20, 30, 12, [255, 255, 0]);
    let doc = FakeDocument::new(vec![FakePage {
        raster: Some(raster),
        spans: vec![body("marked", 21.0, 11.0), body("unmarked", 21.0, 200.0)],
        ..Default::default()
    }]);

    let out = extract_from_document(&doc, &markdown());

    assert_eq!(doc.renders.get(), 1);
    assert_eq!(out.regions.len(), 1);
    let region = &out.regions[0];
    assert_eq!(region.origin(), RegionOrigin::ColorDetected);
    assert_eq!(region.rect(), Rect::new(20.0, 10.0, 35.0, 16.0));
    assert_eq!(out.content, "marked");
    assert_eq!(out.stats.color_regions, 1);
}

#[test]
fn other_colors_are_ignored_unless_targeted() {
    let mut raster = RgbImage::from_pixel(600, 600, Rgb([255, 255, 255]));
    fill(&mut raster, 40, 20, 30, 12, [0, 255, 0]);
    let page = || FakePage {
        raster: Some(raster.clone()),
        spans: vec![body("green", 21.0, 11.0)],
        ..Default::default()
    };

    let yellow = extract_from_document(&FakeDocument::new(vec![page()]), &markdown());
    assert!(yellow.regions.is_empty());

    let config = ExtractionConfig::builder()
        .target_color("green".parse().unwrap())
        .build()
        .unwrap();
    let green = extract_from_document(&FakeDocument::new(vec![page()]), &config);
    assert_eq!(green.content, "green");
}

// ── Formatting ───────────────────────────────────────────────────────────────

#[test]
fn large_bold_italic_span_becomes_plain_header() {
    let doc = FakeDocument::new(vec![FakePage {
        annotations: vec![highlight(40.0, 90.0, 400.0, 115.0)],
        spans: vec![span(
            "Arial-BoldItalic spanned text",
            "Arial-BoldItalic",
            20.0,
            42.0,
            92.0,
        )],
        ..Default::default()
    }]);

    let out = extract_from_document(&doc, &markdown());

    assert_eq!(out.content, "# Arial-BoldItalic spanned text");
    let block = &out.paragraphs[0].blocks[0];
    assert!(block.is_bold && block.is_italic);
    assert_eq!(block.header_level, 1);
}

#[test]
fn consecutive_body_spans_merge_into_one_paragraph() {
    let page = || FakePage {
        annotations: vec![highlight(40.0, 90.0, 400.0, 105.0)],
        spans: vec![body("Hello", 42.0, 92.0), body("world", 90.0, 92.0)],
        ..Default::default()
    };

    let md = extract_from_document(&FakeDocument::new(vec![page()]), &markdown());
    assert_eq!(md.content, "Hello world");
    assert_eq!(md.paragraphs.len(), 1);

    let html = extract_from_document(&FakeDocument::new(vec![page()]), &html_fragment());
    assert_eq!(html.content, "<p>Hello world</p>");
}

#[test]
fn paragraphs_never_span_regions() {
    let doc = FakeDocument::new(vec![FakePage {
        annotations: vec![
            highlight(40.0, 50.0, 400.0, 75.0),
            highlight(40.0, 100.0, 400.0, 115.0),
            highlight(40.0, 200.0, 400.0, 215.0),
        ],
        spans: vec![
            span("Results", "Helvetica-Bold", 16.0, 42.0, 52.0),
            body("first finding", 42.0, 102.0),
            body("second finding", 42.0, 202.0),
        ],
        ..Default::default()
    }]);

    let out = extract_from_document(&doc, &markdown());

    assert_eq!(out.content, "### Results\n\nfirst finding\n\nsecond finding");
    assert_eq!(out.stats.regions_with_text, 3);
}

#[test]
fn html_document_escapes_text() {
    let doc = FakeDocument::new(vec![FakePage {
        annotations: vec![highlight(40.0, 90.0, 400.0, 105.0)],
        spans: vec![body("x < y & \"z\"", 42.0, 92.0)],
        ..Default::default()
    }]);
    let config = ExtractionConfig::builder()
        .format(OutputFormat::Html)
        .build()
        .unwrap();

    let out = extract_from_document(&doc, &config);

    assert!(out.content.starts_with("<!DOCTYPE html>"));
    assert!(out
        .content
        .contains("<p>x &lt; y &amp; &quot;z&quot;</p>"));
}

// ── Degenerate input ─────────────────────────────────────────────────────────

#[test]
fn no_highlights_yields_empty_output() {
    let pages = || vec![FakePage::default(), FakePage::default()];

    let md = extract_from_document(&FakeDocument::new(pages()), &markdown());
    assert_eq!(md.content, "");
    assert!(md.regions.is_empty());
    assert!(md.diagnostics.is_empty());
    assert_eq!(md.stats.pages_scanned, 2);

    let html = extract_from_document(&FakeDocument::new(pages()), &html_fragment());
    assert_eq!(html.content, "");

    let config = ExtractionConfig::builder()
        .format(OutputFormat::Html)
        .build()
        .unwrap();
    let doc = extract_from_document(&FakeDocument::new(pages()), &config);
    assert!(doc.content.contains("<body>\n\n</body>"));
}

#[test]
fn empty_document() {
    let out = extract_from_document(&FakeDocument::new(vec![]), &markdown());
    assert_eq!(out.content, "");
    assert_eq!(out.stats.pages_scanned, 0);
}

#[test]
fn highlight_without_text_contributes_nothing() {
    let doc = FakeDocument::new(vec![FakePage {
        annotations: vec![highlight(40.0, 90.0, 400.0, 105.0)],
        spans: vec![body("elsewhere", 42.0, 500.0), body("   ", 42.0, 92.0)],
        ..Default::default()
    }]);

    let out = extract_from_document(&doc, &markdown());

    assert_eq!(out.regions.len(), 1);
    assert_eq!(out.content, "");
    assert_eq!(out.stats.regions_with_text, 0);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn output_is_deterministic() {
    let make = || {
        FakeDocument::new(vec![FakePage {
            annotations: vec![
                highlight(40.0, 200.0, 400.0, 215.0),
                highlight(40.0, 90.0, 400.0, 105.0),
            ],
            spans: vec![body("b", 42.0, 202.0), body("a", 42.0, 92.0)],
            ..Default::default()
        }])
    };

    let first = extract_from_document(&make(), &markdown());
    let second = extract_from_document(&make(), &markdown());
    assert_eq!(first.content, second.content);
    assert_eq!(first.regions, second.regions);
}

// ── Failure isolation ────────────────────────────────────────────────────────

#[test]
fn broken_annotation_page_is_skipped() {
    let doc = FakeDocument::new(vec![
        FakePage {
            fail_annotations: true,
            ..Default::default()
        },
        FakePage {
            annotations: vec![highlight(40.0, 90.0, 400.0, 105.0)],
            spans: vec![body("survivor", 42.0, 92.0)],
            ..Default::default()
        },
    ]);

    let out = extract_from_document(&doc, &markdown());

    assert_eq!(out.content, "survivor");
    assert!(out.is_degraded());
    assert!(matches!(
        out.diagnostics[..],
        [Diagnostic::Page(PageError::AnnotationsFailed { page: 0, .. })]
    ));
}

#[test]
fn broken_render_page_is_skipped() {
    let mut raster = RgbImage::from_pixel(600, 600, Rgb([255, 255, 255]));
    fill(&mut raster, 40, 20, 30, 12, [255, 255, 0]);
    let doc = FakeDocument::new(vec![
        FakePage {
            fail_render: true,
            ..Default::default()
        },
        FakePage {
            raster: Some(raster),
            spans: vec![body("rendered", 21.0, 11.0)],
            ..Default::default()
        },
    ]);

    let out = extract_from_document(&doc, &markdown());

    assert_eq!(doc.renders.get(), 2);
    assert_eq!(out.content, "rendered");
    assert!(matches!(
        out.diagnostics[..],
        [Diagnostic::Page(PageError::RenderFailed { page: 0, .. })]
    ));
}

#[test]
fn broken_region_is_skipped() {
    let doc = FakeDocument::new(vec![
        FakePage {
            annotations: vec![highlight(40.0, 90.0, 400.0, 105.0)],
            fail_text: true,
            ..Default::default()
        },
        FakePage {
            annotations: vec![highlight(40.0, 90.0, 400.0, 105.0)],
            spans: vec![body("readable", 42.0, 92.0)],
            ..Default::default()
        },
    ]);

    let out = extract_from_document(&doc, &markdown());

    assert_eq!(out.regions.len(), 2);
    assert_eq!(out.content, "readable");
    match &out.diagnostics[..] {
        [Diagnostic::Region(RegionError::TextLayoutFailed { page, rect, .. })] => {
            assert_eq!(*page, 0);
            assert_eq!(*rect, Rect::new(40.0, 90.0, 400.0, 105.0));
        }
        other => panic!("unexpected diagnostics: {other:?}"),
    }
}

#[test]
fn out_of_range_pages_are_reported() {
    let doc = FakeDocument::new(vec![FakePage {
        annotations: vec![highlight(40.0, 90.0, 400.0, 105.0)],
        spans: vec![body("only page", 42.0, 92.0)],
        ..Default::default()
    }]);
    let config = ExtractionConfig::builder()
        .pages(PageSelection::Set(vec![1, 5]))
        .build()
        .unwrap();

    let out = extract_from_document(&doc, &config);

    assert_eq!(out.content, "only page");
    assert_eq!(out.stats.pages_scanned, 1);
    assert_eq!(
        out.diagnostics,
        vec![Diagnostic::Page(PageError::OutOfRange { page: 4, total: 1 })]
    );
}

#[test]
fn overlong_page_range_is_one_diagnostic() {
    let doc = FakeDocument::new(vec![
        FakePage {
            annotations: vec![highlight(40.0, 90.0, 400.0, 105.0)],
            spans: vec![body("first", 42.0, 92.0)],
            ..Default::default()
        },
        FakePage::default(),
    ]);
    let config = ExtractionConfig::builder()
        .pages("1-300000000".parse().unwrap())
        .build()
        .unwrap();

    let out = extract_from_document(&doc, &config);

    assert_eq!(out.content, "first");
    assert_eq!(out.stats.pages_scanned, 2);
    assert_eq!(
        out.diagnostics,
        vec![Diagnostic::Page(PageError::RangeOutOfRange {
            first: 2,
            last: 299_999_999,
            total: 2,
        })]
    );
}

// ── Progress ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    detection_pages: AtomicUsize,
    pages_scanned: AtomicUsize,
    page_errors: AtomicUsize,
    regions_detected: AtomicUsize,
    regions_extracted: AtomicUsize,
    completed: AtomicUsize,
}

impl ExtractionProgressCallback for Recorder {
    fn on_detection_start(&self, total_pages: usize) {
        self.detection_pages.store(total_pages, Ordering::SeqCst);
    }
    fn on_page_scanned(&self, _page_num: usize, _regions: usize) {
        self.pages_scanned.fetch_add(1, Ordering::SeqCst);
    }
    fn on_page_error(&self, _page_num: usize, _error: &str) {
        self.page_errors.fetch_add(1, Ordering::SeqCst);
    }
    fn on_regions_detected(&self, total_regions: usize) {
        self.regions_detected.store(total_regions, Ordering::SeqCst);
    }
    fn on_region_extracted(&self, _index: usize, _total: usize, _paragraphs: usize) {
        self.regions_extracted.fetch_add(1, Ordering::SeqCst);
    }
    fn on_extraction_complete(&self, _regions: usize, _paragraphs: usize) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn progress_events_cover_every_stage() {
    let recorder = Arc::new(Recorder::default());
    let config = ExtractionConfig::builder()
        .progress_callback(recorder.clone() as Arc<dyn ExtractionProgressCallback>)
        .build()
        .unwrap();
    let doc = FakeDocument::new(vec![
        FakePage {
            annotations: vec![
                highlight(40.0, 90.0, 400.0, 105.0),
                highlight(40.0, 190.0, 400.0, 205.0),
            ],
            spans: vec![body("one", 42.0, 92.0), body("two", 42.0, 192.0)],
            ..Default::default()
        },
        FakePage {
            fail_annotations: true,
            ..Default::default()
        },
    ]);

    extract_from_document(&doc, &config);

    assert_eq!(recorder.detection_pages.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.pages_scanned.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.page_errors.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.regions_detected.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.regions_extracted.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.completed.load(Ordering::SeqCst), 1);
}

// ── Persistence and entry points ─────────────────────────────────────────────

#[test]
fn persisted_file_matches_rendered_output() {
    let doc = FakeDocument::new(vec![FakePage {
        annotations: vec![highlight(40.0, 90.0, 400.0, 105.0)],
        spans: vec![body("keep me", 42.0, 92.0)],
        ..Default::default()
    }]);
    let out = extract_from_document(&doc, &html_fragment());
    let dir = tempfile::tempdir().unwrap();

    let written = persist(&out.content, dir.path().join("notes"), out.format).unwrap();

    assert_eq!(written, dir.path().join("notes.html"));
    assert_eq!(std::fs::read_to_string(written).unwrap(), "<p>keep me</p>");
}

#[test]
fn unsupported_format_is_rejected() {
    let err = "pdf".parse::<OutputFormat>().unwrap_err();
    assert!(matches!(err, HighlightError::UnsupportedFormat { ref format } if format == "pdf"));
}

#[tokio::test]
async fn async_entry_point_reports_missing_file() {
    let err = extract_highlights_async("/no/such/dir/paper.pdf", &markdown())
        .await
        .unwrap_err();
    assert!(matches!(err, HighlightError::FileNotFound { .. }));
}

#[test]
fn async_entry_point_rejects_non_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.pdf");
    std::fs::write(&path, b"just text, not a pdf").unwrap();

    let err = tokio_test::block_on(extract_highlights_async(&path, &markdown())).unwrap_err();
    assert!(matches!(err, HighlightError::NotAPdf { .. }));
}

#[test]
fn output_serialises_to_json() {
    let doc = FakeDocument::new(vec![FakePage {
        annotations: vec![highlight(40.0, 90.0, 400.0, 105.0)],
        spans: vec![body("json", 42.0, 92.0)],
        ..Default::default()
    }]);
    let out = extract_from_document(&doc, &markdown());

    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["content"], "json");
    assert_eq!(json["format"], "markdown");
    assert_eq!(json["regions"][0]["origin"], "annotation");
    assert_eq!(json["stats"]["regions"], 1);
}
