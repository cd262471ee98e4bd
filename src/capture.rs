//! Sequential capture driver: scroll, settle, capture, repeat.
//!
//! The page is walked in viewport-sized steps. Each step must finish
//! rendering at its offset before the viewport is captured, so steps run
//! strictly one after another; nothing here is concurrent.
//!
//! The driver talks to the page through [`CaptureSource`]. A browser
//! extension, a CDP session or the simulated [`crate::source::StitchedImageSource`]
//! can all stand behind it.
//!
//! If the source fails at any step the whole traversal fails. The captures
//! taken so far are discarded: a PDF of the first half of a page is not a
//! PDF of the page.

use crate::config::{validate_pixel_ratio, CaptureConfig};
use crate::error::Snap2PdfError;
use crate::pipeline::plan;
use crate::pipeline::reconcile::Capture;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Page geometry as reported by the page, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Full scrollable height of the document.
    pub total_height: f64,
    pub device_pixel_ratio: f64,
    /// Scroll position before capture started.
    pub initial_scroll_y: f64,
}

/// A page that can be scrolled and captured one viewport at a time.
pub trait CaptureSource: Send {
    /// Measure the page.
    fn metrics(&mut self) -> impl Future<Output = Result<PageMetrics, Snap2PdfError>> + Send;

    /// Ask the page to scroll to `y` and return the offset it actually reached.
    fn scroll_to(&mut self, y: f64) -> impl Future<Output = Result<f64, Snap2PdfError>> + Send;

    /// Capture the visible viewport in device pixels.
    fn capture_viewport(&mut self)
        -> impl Future<Output = Result<DynamicImage, Snap2PdfError>> + Send;
}

/// Everything one traversal produced.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    /// Captures in step order; the last one is flagged `is_last`.
    pub captures: Vec<Capture>,
    /// Page geometry measured before the first scroll.
    pub metrics: PageMetrics,
}

/// Walk the page and collect one capture per step.
///
/// # Errors
/// * [`Snap2PdfError::InvalidConfig`] — the pixel ratio in use is below 1
/// * [`Snap2PdfError::EmptyCapture`] — the page has no height
/// * [`Snap2PdfError::TooManySteps`] — the page exceeds `config.max_steps`
/// * [`Snap2PdfError::CaptureFailed`] — the source failed at some step
pub async fn collect_captures<S: CaptureSource>(
    source: &mut S,
    config: &CaptureConfig,
) -> Result<CaptureSession, Snap2PdfError> {
    let metrics = source.metrics().await?;
    validate_pixel_ratio(config.effective_pixel_ratio(metrics.device_pixel_ratio))?;
    let steps = plan::step_count(metrics.total_height, metrics.viewport_height)?;
    info!(
        "Page is {:.0}px tall, viewport {:.0}px → {} steps",
        metrics.total_height, metrics.viewport_height, steps
    );

    if steps == 0 {
        return Err(Snap2PdfError::EmptyCapture { captures: 0 });
    }
    if steps > config.max_steps {
        return Err(Snap2PdfError::TooManySteps {
            steps,
            max: config.max_steps,
        });
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_capture_start(steps);
    }

    let result = traverse(source, &metrics, steps, config).await;

    // Put the page back even when the traversal failed part-way.
    if config.restore_scroll {
        if let Err(e) = source.scroll_to(metrics.initial_scroll_y).await {
            warn!(
                "Could not restore scroll position {:.0}: {}",
                metrics.initial_scroll_y, e
            );
        }
    }

    Ok(CaptureSession {
        captures: result?,
        metrics,
    })
}

async fn traverse<S: CaptureSource>(
    source: &mut S,
    metrics: &PageMetrics,
    steps: usize,
    config: &CaptureConfig,
) -> Result<Vec<Capture>, Snap2PdfError> {
    let settle = Duration::from_millis(config.settle_delay_ms);
    let mut captures = Vec::with_capacity(steps);

    for step in 0..steps {
        let requested = plan::requested_offset(step, metrics.viewport_height);
        let actual = source
            .scroll_to(requested)
            .await
            .map_err(|e| step_failed(step, e))?;

        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        let image = source
            .capture_viewport()
            .await
            .map_err(|e| step_failed(step, e))?;

        debug!(
            "Step {}/{}: requested {:.0}, reached {:.0}, captured {}x{} px",
            step + 1,
            steps,
            requested,
            actual,
            image.width(),
            image.height()
        );

        captures.push(Capture {
            image,
            requested_scroll_y: requested,
            actual_scroll_y: actual,
            is_last: step + 1 == steps,
        });

        if let Some(ref cb) = config.progress_callback {
            cb.on_step_captured(step, steps);
        }
    }

    Ok(captures)
}

fn step_failed(step: usize, err: Snap2PdfError) -> Snap2PdfError {
    match err {
        Snap2PdfError::CaptureFailed { .. } => err,
        other => Snap2PdfError::CaptureFailed {
            step,
            detail: other.to_string(),
        },
    }
}
