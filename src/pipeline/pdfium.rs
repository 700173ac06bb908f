//! pdfium-backed [`Document`] implementation.
//!
//! pdfium uses a bottom-left origin; everything handed to the pipeline is
//! flipped to top-left using the page height, so annotation rectangles,
//! text bounding boxes and raster pixels (divided by the render scale) all
//! share one coordinate space.
//!
//! The open `PdfDocument` is owned by [`PdfiumDocument`] and closed when it
//! is dropped, on every exit path of the caller.

use crate::document::Document;
use crate::error::{HighlightError, PageError, RegionError};
use crate::model::{Annotation, AnnotationKind, LayoutBlock, LayoutSpan, Rect, StyleFlags};
use crate::pipeline::layout::build_layout;
use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bind to a pdfium library.
///
/// Looks in `PDFIUM_LIB_PATH` first, then the working directory, then the
/// system library path.
pub fn bind_pdfium() -> Result<Pdfium, HighlightError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(lib) if !lib.is_empty() => Pdfium::bind_to_library(PathBuf::from(lib)),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| HighlightError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// An open PDF document.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumDocument<'a> {
    /// Open `path`, mapping pdfium load failures onto document errors.
    pub fn open(
        pdfium: &'a Pdfium,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Self, HighlightError> {
        let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    HighlightError::WrongPassword {
                        path: path.to_path_buf(),
                    }
                } else {
                    HighlightError::PasswordRequired {
                        path: path.to_path_buf(),
                    }
                }
            } else {
                HighlightError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        info!("PDF loaded: {} pages", document.pages().len());
        Ok(Self { document })
    }

    fn page(&self, index: usize) -> Result<PdfPage<'a>, String> {
        let pages = self.document.pages();
        let total = pages.len() as usize;
        if index >= total {
            return Err(format!("page index {} out of range ({} pages)", index, total));
        }
        pages.get(index as u16).map_err(|e| format!("{:?}", e))
    }
}

impl Document for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, page: usize, scale: f32) -> Result<RgbImage, PageError> {
        let fail = |detail: String| PageError::RenderFailed { page, detail };
        let pdf_page = self.page(page).map_err(fail)?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = pdf_page
            .render_with_config(&render_config)
            .map_err(|e| fail(format!("{:?}", e)))?;

        let image = bitmap.as_image().to_rgb8();
        debug!(
            "Rendered page {} → {}x{} px",
            page,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    fn annotations(&self, page: usize) -> Result<Vec<Annotation>, PageError> {
        let pdf_page = self
            .page(page)
            .map_err(|detail| PageError::AnnotationsFailed { page, detail })?;
        let height = pdf_page.height().value;

        let mut annotations = Vec::new();
        for annotation in pdf_page.annotations().iter() {
            let kind = match annotation.annotation_type() {
                PdfPageAnnotationType::Highlight => AnnotationKind::Highlight,
                PdfPageAnnotationType::Underline => AnnotationKind::Underline,
                PdfPageAnnotationType::Squiggly => AnnotationKind::Squiggly,
                PdfPageAnnotationType::Text => AnnotationKind::Text,
                _ => AnnotationKind::Other,
            };
            match annotation.bounds() {
                Ok(bounds) => annotations.push(Annotation {
                    kind,
                    rect: Rect::new(
                        bounds.left().value,
                        height - bounds.top().value,
                        bounds.right().value,
                        height - bounds.bottom().value,
                    ),
                }),
                Err(e) => warn!("Page {}: skipping annotation without bounds: {:?}", page, e),
            }
        }

        Ok(annotations)
    }

    fn text_layout(&self, page: usize, clip: &Rect) -> Result<Vec<LayoutBlock>, RegionError> {
        let fail = |detail: String| RegionError::TextLayoutFailed {
            page,
            rect: *clip,
            detail,
        };
        let pdf_page = self.page(page).map_err(fail)?;
        let height = pdf_page.height().value;
        let page_text = pdf_page.text().map_err(|e| fail(format!("{:?}", e)))?;

        let mut spans = Vec::new();
        for object in pdf_page.objects().iter() {
            let Some(text_object) = object.as_text_object() else {
                continue;
            };
            let bounds = match object.bounds() {
                Ok(b) => b,
                Err(e) => {
                    debug!("Page {}: text object without bounds: {:?}", page, e);
                    continue;
                }
            };
            let bbox = Rect::new(
                bounds.left().value,
                height - bounds.top().value,
                bounds.right().value,
                height - bounds.bottom().value,
            );
            let Some(visible) = bbox.intersection(clip) else {
                continue;
            };

            let text = if clip.contains(&bbox) {
                text_object.text()
            } else {
                page_text.inside_rect(PdfRect::new_from_values(
                    height - visible.y1,
                    visible.x0,
                    height - visible.y0,
                    visible.x1,
                ))
            };

            let font = text_object.font();
            let mut flags = 0;
            if font.is_italic() {
                flags |= StyleFlags::ITALIC;
            }
            if font.is_bold_reenforced() {
                flags |= StyleFlags::BOLD;
            }

            spans.push(LayoutSpan {
                text,
                font: font.name(),
                size: text_object.scaled_font_size().value,
                flags: StyleFlags(flags),
                bbox: visible,
            });
        }

        Ok(build_layout(spans))
    }
}
