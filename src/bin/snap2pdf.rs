//! CLI binary for snap2pdf.
//!
//! A thin shim over the library crate: it maps CLI flags to
//! `CaptureConfig`, picks a capture source from the input, and prints
//! results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use snap2pdf::{
    capture_pdf, convert_session, write_pdf, CaptureConfig, CaptureOutput,
    CaptureProgressCallback, ProgressCallback, StitchedImageSource,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

/// Terminal progress callback: a spinner while the page is measured, then a
/// bar over the capture steps.
struct CliProgressCallback {
    bar: ProgressBar,
    dropped: AtomicUsize,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_capture_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Measuring page…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            dropped: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} steps  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Capturing");
        self.bar.reset_eta();
    }
}

impl CaptureProgressCallback for CliProgressCallback {
    fn on_capture_start(&self, total_steps: usize) {
        self.activate_bar(total_steps);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Capturing page in {total_steps} steps…"))
        ));
    }

    fn on_step_captured(&self, step: usize, total_steps: usize) {
        self.bar.println(format!(
            "  {} Step {:>3}/{:<3}",
            green("✓"),
            step + 1,
            total_steps
        ));
        self.bar.inc(1);
    }

    fn on_page_dropped(&self, step: usize) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Step {:>3}  {}",
            dim("·"),
            step + 1,
            dim("fully overlapped, dropped")
        ));
    }

    fn on_build_complete(&self, pages: usize, pdf_bytes: usize) {
        self.bar.finish_and_clear();
        let dropped = self.dropped.load(Ordering::SeqCst);
        eprintln!(
            "{} {} pages assembled  {}{}",
            green("✔"),
            bold(&pages.to_string()),
            dim(&format!("{pdf_bytes} bytes")),
            if dropped > 0 {
                dim(&format!("  ({dropped} dropped)"))
            } else {
                String::new()
            }
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Paginate a full-page screenshot, 800 CSS px per page
  snap2pdf long-screenshot.png

  # Retina screenshot: 2 device pixels per CSS pixel
  snap2pdf --dpr 2 --viewport-height 900 shot@2x.png -o shot.pdf

  # Assemble a session recorded by a browser extension
  snap2pdf session/manifest.json -o page.pdf

  # Letter-width pages, smaller JPEGs, JSON summary on stdout
  snap2pdf --page-width 612 --quality 75 --json page.png

SESSION MANIFEST:
  {
    "devicePixelRatio": 2,
    "frames": [
      { "image": "step-0.png", "requestedScrollY": 0,   "actualScrollY": 0 },
      { "dataUrl": "data:image/png;base64,…", "requestedScrollY": 900, "actualScrollY": 640 }
    ]
  }

  Frame images are paths relative to the manifest or base64 data: URLs.
  `isLast` defaults to the final frame.

ENVIRONMENT VARIABLES:
  RUST_LOG                Override the log filter (e.g. snap2pdf=debug)
  SNAP2PDF_*              Every flag has an env equivalent, see --help
"#;

/// Turn scrolling screenshots into a paginated PDF.
#[derive(Parser, Debug)]
#[command(
    name = "snap2pdf",
    version,
    about = "Turn scrolling screenshots into a paginated PDF",
    long_about = "Capture a tall page one viewport at a time and assemble the captures into a \
PDF, one page per viewport, with the overlap of the final scroll step cropped away. The input \
is either a full-page screenshot (paginated through a simulated viewport) or a JSON manifest \
of a recorded capture session.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Full-page screenshot (PNG/JPEG) or session manifest (.json).
    input: PathBuf,

    /// Write the PDF here. Defaults to the input path with a .pdf extension.
    #[arg(short, long, env = "SNAP2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Viewport height in CSS pixels (screenshot input only).
    #[arg(long, env = "SNAP2PDF_VIEWPORT_HEIGHT", default_value_t = 800.0)]
    viewport_height: f64,

    /// Device pixels per CSS pixel. Overrides the session's recorded value.
    #[arg(long, env = "SNAP2PDF_DPR")]
    dpr: Option<f64>,

    /// PDF page width in points (595.28 = A4).
    #[arg(long, env = "SNAP2PDF_PAGE_WIDTH", default_value_t = snap2pdf::A4_WIDTH_POINTS)]
    page_width: f64,

    /// JPEG quality (1–100).
    #[arg(long, env = "SNAP2PDF_QUALITY", default_value_t = 92,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Pause after each scroll before capturing, in milliseconds.
    #[arg(long, env = "SNAP2PDF_SETTLE_DELAY_MS", default_value_t = 0)]
    settle_delay_ms: u64,

    /// Refuse pages that need more capture steps than this.
    #[arg(long, env = "SNAP2PDF_MAX_STEPS", default_value_t = 200)]
    max_steps: usize,

    /// Print a JSON summary (pages + stats) on stdout.
    #[arg(long, env = "SNAP2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SNAP2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SNAP2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SNAP2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs when it is active.
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
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn CaptureProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("pdf"));

    // ── Run capture ──────────────────────────────────────────────────────
    let output = if is_session(&cli.input) {
        convert_session(&cli.input, &config)
            .await
            .context("Session conversion failed")?
    } else {
        capture_screenshot(&cli, &config)
            .await
            .context("Capture failed")?
    };

    write_pdf(&output_path, &output.pdf)
        .await
        .context("Failed to write PDF")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    if !cli.quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            output.stats.pages,
            output.stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        if output.stats.dropped_captures > 0 || output.stats.cropped_rows > 0 {
            eprintln!(
                "   {} rows cropped  /  {} captures dropped",
                dim(&output.stats.cropped_rows.to_string()),
                dim(&output.stats.dropped_captures.to_string()),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `CaptureConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<CaptureConfig> {
    let mut builder = CaptureConfig::builder()
        .page_width_points(cli.page_width)
        .jpeg_quality(cli.quality)
        .settle_delay_ms(cli.settle_delay_ms)
        .max_steps(cli.max_steps);

    if let Some(dpr) = cli.dpr {
        builder = builder.device_pixel_ratio(dpr);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn is_session(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Paginate a full-page screenshot through a simulated viewport.
async fn capture_screenshot(cli: &Cli, config: &CaptureConfig) -> Result<CaptureOutput> {
    let path = cli.input.clone();
    let page = tokio::task::spawn_blocking(move || image::open(&path))
        .await
        .context("Image decode task panicked")?
        .with_context(|| format!("Failed to open image {}", cli.input.display()))?;

    let dpr = cli.dpr.unwrap_or(1.0);
    let mut source = StitchedImageSource::new(page, cli.viewport_height, dpr)
        .context("Invalid viewport geometry")?;

    Ok(capture_pdf(&mut source, config).await?)
}
