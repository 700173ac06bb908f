//! CLI binary for pdf-highlights.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_highlights::{
    extract_highlights_async, persist, ExtractionConfig, ExtractionProgressCallback,
    HighlightColor, OutputFormat, PageSelection, ProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar driven by extraction events.
///
/// The bar is reused for each phase: scanning pages for annotations, the
/// color pass when there are none, then reading regions.
struct CliProgressCallback {
    bar: ProgressBar,
    page_errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_errors: AtomicUsize::new(0),
        })
    }

    fn start_phase(&self, prefix: &'static str, unit: &str, total: usize) {
        let style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  \
             [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {unit}  {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_style(style);
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_prefix(prefix);
        self.bar.reset_eta();
    }

    /// One page done. A full bar means the annotation pass found nothing
    /// and the color pass is starting over the same pages.
    fn advance_page(&self) {
        let len = self.bar.length().unwrap_or(0);
        if len > 0 && self.bar.position() >= len {
            self.start_phase("Color scan", "pages", len as usize);
        }
        self.bar.inc(1);
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_detection_start(&self, total_pages: usize) {
        self.start_phase("Scanning", "pages", total_pages);
    }

    fn on_page_scanned(&self, page_num: usize, regions: usize) {
        self.bar
            .set_message(format!("page {page_num}: {regions} highlights"));
        self.advance_page();
    }

    fn on_page_error(&self, page_num: usize, error: &str) {
        self.page_errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} Page {:>3}  {}", red("✗"), page_num, red(&msg)));
        self.advance_page();
    }

    fn on_regions_detected(&self, total_regions: usize) {
        self.start_phase("Extracting", "regions", total_regions);
    }

    fn on_region_extracted(&self, index: usize, total: usize, paragraphs: usize) {
        self.bar
            .set_message(format!("region {index}/{total}: {paragraphs} paragraphs"));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, regions: usize, paragraphs: usize) {
        self.bar.finish_and_clear();
        let errors = self.page_errors.load(Ordering::SeqCst);

        if errors == 0 {
            eprintln!(
                "{} {} regions → {} paragraphs",
                green("✔"),
                bold(&regions.to_string()),
                bold(&paragraphs.to_string())
            );
        } else {
            eprintln!(
                "{} {} regions → {} paragraphs  ({} page errors)",
                cyan("⚠"),
                bold(&regions.to_string()),
                bold(&paragraphs.to_string()),
                red(&errors.to_string())
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Highlights as Markdown (stdout)
  pdf-highlights paper.pdf

  # HTML document written to a file (.html appended)
  pdf-highlights paper.pdf --format html -o notes

  # Green highlighter, looser color match, first ten pages
  pdf-highlights --color green --tolerance 80 --pages 1-10 paper.pdf

  # Full result with regions and diagnostics as JSON
  pdf-highlights --json paper.pdf > highlights.json

DETECTION:
  Native highlight annotations are used when the document has any.
  Otherwise each page is rendered and areas close to --color are read.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (default: ./, then system)
  RUST_LOG                Override log filter (e.g. pdf_highlights=debug)
"#;

/// Extract highlighted text from PDF documents.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-highlights",
    version,
    about = "Extract highlighted text from PDF documents",
    long_about = "Extract the passages highlighted in a PDF, either as native highlight \
annotations or as highlighter-colored areas, and render them as Markdown or HTML with \
headers, bold and italic preserved.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF file.
    pdf_path: Option<PathBuf>,

    /// Output format.
    #[arg(long, env = "PDF_HIGHLIGHTS_FORMAT", value_enum, default_value = "markdown")]
    format: FormatArg,

    /// Write output to this file instead of stdout (.md/.html appended if missing).
    #[arg(short, long, env = "PDF_HIGHLIGHTS_OUTPUT")]
    output: Option<PathBuf>,

    /// Highlight color: a name (yellow, green, pink, blue, orange), #RRGGBB, or r,g,b.
    #[arg(long, env = "PDF_HIGHLIGHTS_COLOR", default_value = "yellow")]
    color: String,

    /// Summed RGB distance below which a pixel counts as highlighted.
    #[arg(long, env = "PDF_HIGHLIGHTS_TOLERANCE", default_value_t = 50)]
    tolerance: u32,

    /// Render scale for color detection.
    #[arg(long, env = "PDF_HIGHLIGHTS_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Smallest highlight area kept, in rendered px².
    #[arg(long, env = "PDF_HIGHLIGHTS_MIN_AREA", default_value_t = 100.0)]
    min_area: f64,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF_HIGHLIGHTS_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF_HIGHLIGHTS_PASSWORD")]
    password: Option<String>,

    /// HTML only: emit the fragments without the document shell.
    #[arg(long)]
    fragment: bool,

    /// Output structured JSON (ExtractionOutput) instead of the formatted text.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF_HIGHLIGHTS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_HIGHLIGHTS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_HIGHLIGHTS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Markdown,
    Html,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Html => OutputFormat::Html,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(pdf_path) = cli.pdf_path.clone() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; verbose mode always gets them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    let output = extract_highlights_async(&pdf_path, &config)
        .await
        .with_context(|| format!("Failed to extract highlights from {}", pdf_path.display()))?;

    if !cli.quiet {
        for diagnostic in &output.diagnostics {
            eprintln!("  {} {}", cyan("⚠"), dim(&diagnostic.to_string()));
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if let Some(ref output_path) = cli.output {
        let written = persist(&output.content, output_path, config.format)
            .context("Failed to write output")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} regions  {}ms  →  {}",
                green("✔"),
                output.stats.regions,
                output.stats.duration_ms,
                bold(&written.display().to_string()),
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_content(&mut handle, &output.content).context("Failed to write to stdout")?;
    }

    if !cli.quiet && !show_progress && !cli.json {
        eprintln!(
            "Extracted {} regions ({} annotations, {} color) into {} paragraphs in {}ms",
            output.stats.regions,
            output.stats.annotation_regions,
            output.stats.color_regions,
            output.stats.paragraphs,
            output.stats.duration_ms
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let color: HighlightColor = cli
        .color
        .parse()
        .with_context(|| format!("Invalid --color '{}'", cli.color))?;
    let pages: PageSelection = cli.pages.parse().context("Invalid --pages")?;

    let mut builder = ExtractionConfig::builder()
        .target_color(color)
        .tolerance(cli.tolerance)
        .render_scale(cli.scale)
        .min_contour_area(cli.min_area)
        .format(cli.format.into())
        .html_document(!cli.fragment)
        .pages(pages);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Write `content`, ending it with a newline when it is non-empty.
fn write_content(out: &mut impl Write, content: &str) -> io::Result<()> {
    out.write_all(content.as_bytes())?;
    if !content.is_empty() && !content.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}
