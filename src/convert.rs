//! Extraction entry points.
//!
//! [`extract_from_document`] is the pure pipeline: detect → sort → extract
//! per region → assemble per region → render. It never touches the
//! filesystem and never fails; degraded pages and regions are reported in
//! [`ExtractionOutput::diagnostics`]. The path-based functions wrap it with
//! input validation, the pdfium backend and optional persistence.

use crate::config::{ExtractionConfig, OutputFormat};
use crate::document::Document;
use crate::error::HighlightError;
use crate::model::sort_regions;
use crate::output::{ExtractionOutput, ExtractionStats, HighlightSummary};
use crate::pipeline::pdfium::{bind_pdfium, PdfiumDocument};
use crate::pipeline::{assemble, detect, extract, input, render};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extensions that [`persist`] leaves alone.
const KNOWN_EXTENSIONS: [&str; 3] = [".md", ".txt", ".html"];

/// Run the full pipeline over an already-open document.
pub fn extract_from_document(doc: &dyn Document, config: &ExtractionConfig) -> ExtractionOutput {
    let start = Instant::now();

    // ── Step 1: Detect ───────────────────────────────────────────────────
    let detection = detect::detect_highlights(doc, config);
    let mut regions = detection.regions;
    let mut diagnostics = detection.diagnostics;
    let mut stats = ExtractionStats {
        pages_scanned: detection.pages_scanned,
        annotation_regions: detection.annotation_regions,
        color_regions: detection.color_regions,
        regions: regions.len(),
        ..Default::default()
    };

    // ── Step 2: Canonical order ──────────────────────────────────────────
    sort_regions(&mut regions);
    if let Some(ref cb) = config.progress_callback {
        cb.on_regions_detected(regions.len());
    }
    if regions.is_empty() {
        info!("No highlighted text found");
    }

    // ── Step 3: Extract and assemble per region ──────────────────────────
    let total = regions.len();
    let mut paragraphs = Vec::new();
    for (i, region) in regions.iter().enumerate() {
        let produced = match extract::extract_blocks(doc, region, &config.headings) {
            Ok(blocks) => {
                stats.spans += blocks.len();
                let region_paragraphs = assemble::assemble(blocks);
                debug!(
                    "Region {}/{} on page {}: {} paragraphs",
                    i + 1,
                    total,
                    region.page(),
                    region_paragraphs.len()
                );
                let n = region_paragraphs.len();
                paragraphs.extend(region_paragraphs);
                n
            }
            Err(e) => {
                warn!("Skipping region {}/{}: {}", i + 1, total, e);
                diagnostics.push(e.into());
                0
            }
        };
        if produced > 0 {
            stats.regions_with_text += 1;
        }
        if let Some(ref cb) = config.progress_callback {
            cb.on_region_extracted(i + 1, total, produced);
        }
    }

    // ── Step 4: Render ───────────────────────────────────────────────────
    let content = render::render(&paragraphs, config.format, config.html_document);

    stats.paragraphs = paragraphs.len();
    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Extraction complete: {} regions, {} paragraphs, {} diagnostics, {}ms",
        stats.regions,
        stats.paragraphs,
        diagnostics.len(),
        stats.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(stats.regions, stats.paragraphs);
    }

    ExtractionOutput {
        content,
        format: config.format,
        regions,
        paragraphs,
        diagnostics,
        stats,
    }
}

/// Extract highlighted text from the PDF at `pdf_path`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ExtractionOutput)` whenever the document could be opened, even if
/// some pages or regions were skipped (check `output.diagnostics`).
///
/// # Errors
/// Returns `Err(HighlightError)` only for fatal errors:
/// - File not found / permission denied / not a PDF
/// - Corrupt or encrypted document
/// - pdfium library not available
pub fn extract_highlights(
    pdf_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, HighlightError> {
    let path = input::resolve_local(pdf_path.as_ref())?;
    info!("Extracting highlights: {}", path.display());

    let pdfium = bind_pdfium()?;
    let document = PdfiumDocument::open(&pdfium, &path, config.password.as_deref())?;

    Ok(extract_from_document(&document, config))
}

/// Async wrapper around [`extract_highlights`].
///
/// pdfium is blocking and CPU-bound, so the work runs on tokio's blocking
/// thread pool.
pub async fn extract_highlights_async(
    pdf_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, HighlightError> {
    let path = pdf_path.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || extract_highlights(&path, &config))
        .await
        .map_err(|e| HighlightError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Extract with default settings in `format`, optionally writing the result.
///
/// `format` is parsed before the PDF is opened, so an unsupported value
/// fails with [`HighlightError::UnsupportedFormat`] and nothing is written.
/// Returns the formatted string; the file, if any, gets the same content.
pub fn extract_and_format(
    pdf_path: impl AsRef<Path>,
    format: &str,
    output_path: Option<&Path>,
) -> Result<String, HighlightError> {
    let format: OutputFormat = format.parse()?;
    let config = ExtractionConfig::builder().format(format).build()?;
    let output = extract_highlights(pdf_path, &config)?;

    if let Some(path) = output_path {
        let written = persist(&output.content, path, format)?;
        info!("Output saved to {}", written.display());
    }

    Ok(output.content)
}

/// Markdown plus its non-empty lines, for callers that feed highlights into
/// keyword or search tooling.
pub fn extract_sample_highlights(
    pdf_path: impl AsRef<Path>,
) -> Result<HighlightSummary, HighlightError> {
    let output = extract_highlights(pdf_path, &ExtractionConfig::default())?;
    Ok(HighlightSummary {
        sample_highlights: output.sample_highlights(),
        formatted_text: output.content,
    })
}

/// Write `content` to `path`, returning the path actually written.
///
/// When `path` ends in none of `.md`, `.txt` or `.html`, the extension for
/// `format` is appended. Parent directories are created. The write is
/// atomic: content goes to a temp file in the same directory that is then
/// renamed over the target.
pub fn persist(
    content: &str,
    path: impl AsRef<Path>,
    format: OutputFormat,
) -> Result<PathBuf, HighlightError> {
    let path = with_output_extension(path.as_ref(), format);
    let write_failed = |source: std::io::Error| HighlightError::OutputWriteFailed {
        path: path.clone(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_failed)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(content.as_bytes()).map_err(write_failed)?;
    tmp.persist(&path).map_err(|e| write_failed(e.error))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(path)
}

/// `path` unchanged if it already carries a known output extension,
/// otherwise `path` with the format's extension appended.
pub fn with_output_extension(path: &Path, format: OutputFormat) -> PathBuf {
    let name = path.as_os_str().to_string_lossy();
    if KNOWN_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        return path.to_path_buf();
    }
    let mut with_ext: OsString = path.as_os_str().to_owned();
    with_ext.push(format.extension());
    PathBuf::from(with_ext)
}
