//! Configuration types for highlight extraction.
//!
//! Every tunable the detector, extractor and renderer read lives in
//! [`ExtractionConfig`], built via [`ExtractionConfigBuilder`]. The config is
//! passed explicitly into each stage; no stage reads process-wide state.

use crate::error::HighlightError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_highlights::{ExtractionConfig, HighlightColor, OutputFormat};
///
/// let config = ExtractionConfig::builder()
///     .target_color(HighlightColor::GREEN)
///     .tolerance(60)
///     .format(OutputFormat::Html)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Highlight color matched by the raster fallback. Default: yellow.
    pub target_color: HighlightColor,

    /// Summed per-channel distance below which a pixel counts as
    /// highlighted. Strict: a pixel at exactly `tolerance` is excluded.
    /// Default: 50.
    pub tolerance: u32,

    /// Magnification used when rasterising pages for color analysis.
    /// Default: 2.0.
    ///
    /// Raster cost grows with the square of this value; detected boxes are
    /// divided by it to return to PDF points.
    pub render_scale: f32,

    /// Contours with a smaller polygon area (in raster px²) are dropped as
    /// noise. Default: 100.
    pub min_contour_area: f64,

    /// Font-size thresholds for header classification.
    pub headings: HeadingThresholds,

    /// Output format. Default: Markdown.
    pub format: OutputFormat,

    /// Wrap HTML output in a complete document shell. Default: true.
    ///
    /// When false the renderer returns only the concatenated fragments.
    pub html_document: bool,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Pages scanned for highlights. Default: all pages.
    pub pages: PageSelection,

    /// Optional per-stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            target_color: HighlightColor::YELLOW,
            tolerance: 50,
            render_scale: 2.0,
            min_contour_area: 100.0,
            headings: HeadingThresholds::default(),
            format: OutputFormat::Markdown,
            html_document: true,
            password: None,
            pages: PageSelection::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("target_color", &self.target_color)
            .field("tolerance", &self.tolerance)
            .field("render_scale", &self.render_scale)
            .field("min_contour_area", &self.min_contour_area)
            .field("headings", &self.headings)
            .field("format", &self.format)
            .field("html_document", &self.html_document)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pages", &self.pages)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn target_color(mut self, color: HighlightColor) -> Self {
        self.config.target_color = color;
        self
    }

    pub fn tolerance(mut self, tolerance: u32) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn render_scale(mut self, scale: f32) -> Self {
        self.config.render_scale = scale;
        self
    }

    pub fn min_contour_area(mut self, area: f64) -> Self {
        self.config.min_contour_area = area.max(0.0);
        self
    }

    pub fn headings(mut self, headings: HeadingThresholds) -> Self {
        self.config.headings = headings;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn html_document(mut self, v: bool) -> Self {
        self.config.html_document = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, HighlightError> {
        let c = &self.config;
        if !(c.render_scale > 0.0 && c.render_scale <= 8.0) {
            return Err(HighlightError::InvalidConfig(format!(
                "Render scale must be in (0, 8], got {}",
                c.render_scale
            )));
        }
        if c.tolerance == 0 {
            return Err(HighlightError::InvalidConfig(
                "Tolerance must be ≥ 1 (a tolerance of 0 matches no pixel)".into(),
            ));
        }
        c.headings.validate()?;
        Ok(self.config)
    }
}

// ── Heading thresholds ───────────────────────────────────────────────────

/// Font-size ratios (against `baseline`) that promote a span to a header.
///
/// Checked in descending order with exclusive lower bounds; the first match
/// wins. With the defaults a span is level 1 above 1.8×, level 2 above 1.5×,
/// level 3 above 1.3×, and body text otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingThresholds {
    /// Body-text font size in points. Default: 11.0.
    pub baseline: f32,
    pub h1: f32,
    pub h2: f32,
    pub h3: f32,
}

impl Default for HeadingThresholds {
    fn default() -> Self {
        Self {
            baseline: 11.0,
            h1: 1.8,
            h2: 1.5,
            h3: 1.3,
        }
    }
}

impl HeadingThresholds {
    /// Header level for a font size: 1..=3, or 0 for body text.
    ///
    /// Comparison runs in `f64` on values rounded to 0.0001 pt, so
    /// a size of exactly 14.3 pt sits on the 1.3× boundary of an 11 pt
    /// baseline and stays body text.
    pub fn level_for(&self, font_size: f32) -> u8 {
        let size = to_points(font_size);
        let baseline = to_points(self.baseline);
        if size > baseline * to_points(self.h1) {
            1
        } else if size > baseline * to_points(self.h2) {
            2
        } else if size > baseline * to_points(self.h3) {
            3
        } else {
            0
        }
    }

    fn validate(&self) -> Result<(), HighlightError> {
        if !(self.baseline > 0.0) {
            return Err(HighlightError::InvalidConfig(format!(
                "Heading baseline must be > 0, got {}",
                self.baseline
            )));
        }
        if !(self.h3 > 0.0 && self.h2 >= self.h3 && self.h1 >= self.h2) {
            return Err(HighlightError::InvalidConfig(format!(
                "Heading thresholds must satisfy h1 ≥ h2 ≥ h3 > 0, got {} / {} / {}",
                self.h1, self.h2, self.h3
            )));
        }
        Ok(())
    }
}

/// Sizes and ratios are widened to `f64` at 0.0001 resolution.
const SIZE_RESOLUTION: f64 = 1e4;

fn to_points(v: f32) -> f64 {
    (f64::from(v) * SIZE_RESOLUTION).round() / SIZE_RESOLUTION
}

// ── Colors ───────────────────────────────────────────────────────────────

/// An RGB highlight color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightColor(pub [u8; 3]);

impl HighlightColor {
    pub const YELLOW: HighlightColor = HighlightColor([255, 255, 0]);
    pub const GREEN: HighlightColor = HighlightColor([0, 255, 0]);
    pub const PINK: HighlightColor = HighlightColor([255, 192, 203]);
    pub const BLUE: HighlightColor = HighlightColor([0, 191, 255]);
    pub const ORANGE: HighlightColor = HighlightColor([255, 165, 0]);

    /// Sum of per-channel absolute differences.
    pub fn distance(&self, rgb: [u8; 3]) -> u32 {
        self.0
            .iter()
            .zip(rgb.iter())
            .map(|(a, b)| u32::from(a.abs_diff(*b)))
            .sum()
    }

    /// Whether `rgb` is within `tolerance` of this color (strict).
    pub fn is_similar(&self, rgb: [u8; 3], tolerance: u32) -> bool {
        self.distance(rgb) < tolerance
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

impl FromStr for HighlightColor {
    type Err = HighlightError;

    /// Accepts `#RRGGBB`, `RRGGBB`, `r,g,b`, or a named color.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let invalid = || HighlightError::InvalidConfig(format!("Invalid highlight color '{s}'"));

        match s.as_str() {
            "yellow" => return Ok(Self::YELLOW),
            "green" => return Ok(Self::GREEN),
            "pink" => return Ok(Self::PINK),
            "blue" => return Ok(Self::BLUE),
            "orange" => return Ok(Self::ORANGE),
            _ => {}
        }

        if s.contains(',') {
            let parts: Vec<u8> = s
                .split(',')
                .map(|p| p.trim().parse::<u8>().map_err(|_| invalid()))
                .collect::<Result<_, _>>()?;
            return match parts.as_slice() {
                [r, g, b] => Ok(HighlightColor([*r, *g, *b])),
                _ => Err(invalid()),
            };
        }

        let hex = s.strip_prefix('#').unwrap_or(&s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(HighlightColor([channel(0)?, channel(2)?, channel(4)?]))
    }
}

// ── Output format ────────────────────────────────────────────────────────

/// Rendered output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
}

impl OutputFormat {
    /// File extension (with dot) used when persisting without one.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => ".md",
            OutputFormat::Html => ".html",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Markdown => f.write_str("markdown"),
            OutputFormat::Html => f.write_str("html"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = HighlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            _ => Err(HighlightError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

// ── Page selection ───────────────────────────────────────────────────────

/// Specifies which pages of the PDF to scan for highlights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Scan all pages (default).
    #[default]
    All,
    /// Scan a single page (1-indexed).
    Single(usize),
    /// Scan a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Scan specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into sorted, deduplicated 0-indexed page numbers.
    ///
    /// Single and listed pages past the end of the document are kept so the
    /// detector can report each one. A range is clamped to the document;
    /// its overflow is available from [`PageSelection::range_overflow`].
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                (s..(*end).min(total_pages)).collect()
            }
            PageSelection::Set(pages) => pages.iter().filter(|&&p| p >= 1).map(|p| p - 1).collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// The 0-indexed span `(first, last)` of a range that runs past the end
    /// of the document, or `None` when the selection is not a range or fits.
    pub fn range_overflow(&self, total_pages: usize) -> Option<(usize, usize)> {
        match self {
            PageSelection::Range(start, end) if *end > total_pages => {
                let first = ((*start).max(1) - 1).max(total_pages);
                Some((first, end - 1))
            }
            _ => None,
        }
    }
}

impl FromStr for PageSelection {
    type Err = HighlightError;

    /// Parse `all`, `5`, `3-15`, or `1,3,5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let invalid = |why: &str| HighlightError::InvalidConfig(format!("Invalid page selection '{s}': {why}"));

        if s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            let start: usize = start.trim().parse().map_err(|_| invalid("bad range start"))?;
            let end: usize = end.trim().parse().map_err(|_| invalid("bad range end"))?;
            if start < 1 {
                return Err(invalid("pages are 1-indexed"));
            }
            if start > end {
                return Err(invalid("start must be <= end"));
            }
            return Ok(PageSelection::Range(start, end));
        }

        if s.contains(',') {
            let pages: Vec<usize> = s
                .split(',')
                .map(|p| p.trim().parse::<usize>().map_err(|_| invalid("bad page number")))
                .collect::<Result<_, _>>()?;
            if pages.iter().any(|&p| p < 1) {
                return Err(invalid("pages are 1-indexed"));
            }
            return Ok(PageSelection::Set(pages));
        }

        let page: usize = s.parse().map_err(|_| invalid("bad page number"))?;
        if page < 1 {
            return Err(invalid("pages are 1-indexed"));
        }
        Ok(PageSelection::Single(page))
    }
}
