//! # snap2pdf
//!
//! Capture a scrollable page as a sequence of viewport screenshots and
//! assemble them into a single PDF, one page per screenshot.
//!
//! ## Why this crate?
//!
//! Browsers only render what is on screen. A "full page" screenshot is
//! really a walk down the page, one viewport at a time, and the last step
//! almost never lines up: the page refuses to scroll past its bottom, so
//! the final capture overlaps the one before it. This crate drives that
//! walk, crops the overlap away in device pixels, and writes a compact PDF
//! with every capture embedded as a JPEG image scaled to a fixed page
//! width (A4 by default).
//!
//! ## Pipeline Overview
//!
//! ```text
//! CaptureSource (browser tab, recorded session, stitched raster)
//!  │
//!  ├─ 1. Plan       ceil(total / viewport) steps
//!  ├─ 2. Capture    scroll → settle → screenshot, strictly sequential
//!  ├─ 3. Reconcile  crop (requested − actual) × dpr rows off each step
//!  ├─ 4. Encode     RGB → JPEG (spawn_blocking)
//!  └─ 5. Assemble   PDF 1.4: catalog, page tree, image XObjects, xref
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snap2pdf::{capture_to_file, CaptureConfig, StitchedImageSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let page = image::open("long-screenshot.png")?;
//!     let mut source = StitchedImageSource::new(page, 800.0, 1.0)?;
//!     let stats = capture_to_file(&mut source, "page.pdf", &CaptureConfig::default()).await?;
//!     eprintln!("{} pages, {} bytes", stats.pages, stats.pdf_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `snap2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! snap2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod capture;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pdf;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod source;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use capture::{collect_captures, CaptureSession, CaptureSource, PageMetrics};
pub use config::{CaptureConfig, CaptureConfigBuilder, A4_WIDTH_POINTS};
pub use convert::{
    build_pdf, capture_pdf, capture_to_file, convert_session, convert_session_sync, write_pdf,
};
pub use error::Snap2PdfError;
pub use output::{CaptureOutput, CaptureStats, PageSummary};
pub use pdf::build_document;
pub use pipeline::encode::{encode_page, PageImage};
pub use pipeline::reconcile::{reconcile, Capture};
pub use progress::{CaptureProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{FrameRecord, RecordedSession, SessionManifest};
pub use source::StitchedImageSource;
