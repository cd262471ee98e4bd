//! Capture-to-PDF entry points.
//!
//! All of them end in [`build_pdf`]: reconcile the captures, JPEG-encode
//! each frame, assemble the document. They differ only in where the
//! captures come from (a live [`CaptureSource`] or a recorded session) and
//! where the bytes go.

use crate::capture::{collect_captures, CaptureSource};
use crate::config::CaptureConfig;
use crate::error::Snap2PdfError;
use crate::output::{CaptureOutput, CaptureStats, PageSummary};
use crate::pdf::{build_document, page_height_points};
use crate::pipeline::encode::{self, PageImage};
use crate::pipeline::reconcile::{self, Capture};
use crate::session::RecordedSession;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Reconcile, encode and assemble an already-collected capture sequence.
///
/// Synchronous and CPU-bound; the async entry points run it on the
/// blocking pool.
///
/// # Errors
/// * [`Snap2PdfError::EmptyCapture`] / [`Snap2PdfError::IncompleteCapture`] /
///   [`Snap2PdfError::OutOfOrderCapture`] from reconciliation
/// * [`Snap2PdfError::Encoding`] from JPEG encoding or PDF assembly
pub fn build_pdf(
    captures: Vec<Capture>,
    device_pixel_ratio: f64,
    config: &CaptureConfig,
) -> Result<CaptureOutput, Snap2PdfError> {
    let start = Instant::now();
    let capture_count = captures.len();

    // ── Step 1: Crop overlapping captures ────────────────────────────────
    let reconciled = reconcile::reconcile(captures, device_pixel_ratio)?;
    if let Some(ref cb) = config.progress_callback {
        for &step in &reconciled.dropped_steps {
            cb.on_page_dropped(step);
        }
    }

    // ── Step 2: Encode frames to JPEG ────────────────────────────────────
    let mut images: Vec<PageImage> = Vec::with_capacity(reconciled.frames.len());
    for (i, frame) in reconciled.frames.iter().enumerate() {
        images.push(encode::encode_page(&frame.image, config.jpeg_quality, i + 1)?);
    }

    // ── Step 3: Assemble the document ────────────────────────────────────
    let pdf = build_document(&images, config.page_width_points)?;

    let pages: Vec<PageSummary> = reconciled
        .frames
        .iter()
        .zip(&images)
        .enumerate()
        .map(|(i, (frame, image))| PageSummary {
            page_num: i + 1,
            source_step: frame.step,
            width_px: image.width,
            height_px: image.height,
            cropped_rows: frame.cropped_rows,
            height_points: page_height_points(image, config.page_width_points),
            image_bytes: image.bytes.len(),
        })
        .collect();

    let build_duration_ms = start.elapsed().as_millis() as u64;
    let stats = CaptureStats {
        captures: capture_count,
        pages: pages.len(),
        dropped_captures: reconciled.dropped_steps.len(),
        cropped_rows: reconciled.cropped_rows,
        pdf_bytes: pdf.len(),
        capture_duration_ms: 0,
        build_duration_ms,
        total_duration_ms: build_duration_ms,
    };

    info!(
        "Built PDF: {} pages from {} captures, {} bytes in {}ms",
        stats.pages, stats.captures, stats.pdf_bytes, build_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_build_complete(stats.pages, stats.pdf_bytes);
    }

    Ok(CaptureOutput {
        pdf,
        pages,
        stats,
        metrics: None,
    })
}

/// Capture a page from `source` and turn it into a PDF.
///
/// This is the primary entry point for live capture.
pub async fn capture_pdf<S: CaptureSource>(
    source: &mut S,
    config: &CaptureConfig,
) -> Result<CaptureOutput, Snap2PdfError> {
    let total_start = Instant::now();

    // ── Step 1: Traverse the page ────────────────────────────────────────
    let session = collect_captures(source, config).await?;
    let capture_duration_ms = total_start.elapsed().as_millis() as u64;
    let metrics = session.metrics;
    let ratio = config.effective_pixel_ratio(metrics.device_pixel_ratio);
    debug!(
        "Collected {} captures in {}ms (pixel ratio {})",
        session.captures.len(),
        capture_duration_ms,
        ratio
    );

    // ── Step 2: Build on the blocking pool ───────────────────────────────
    let cfg = config.clone();
    let mut output = tokio::task::spawn_blocking(move || build_pdf(session.captures, ratio, &cfg))
        .await
        .map_err(|e| Snap2PdfError::Internal(format!("Build task panicked: {}", e)))??;

    output.metrics = Some(metrics);
    output.stats.capture_duration_ms = capture_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Capture a page and write the PDF to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// half-written PDF behind.
pub async fn capture_to_file<S: CaptureSource>(
    source: &mut S,
    output_path: impl AsRef<Path>,
    config: &CaptureConfig,
) -> Result<CaptureStats, Snap2PdfError> {
    let output = capture_pdf(source, config).await?;
    write_pdf(output_path.as_ref(), &output.pdf).await?;
    Ok(output.stats)
}

/// Build a PDF from a recorded session manifest.
pub async fn convert_session(
    manifest_path: impl AsRef<Path>,
    config: &CaptureConfig,
) -> Result<CaptureOutput, Snap2PdfError> {
    let path = manifest_path.as_ref().to_path_buf();
    let cfg = config.clone();
    tokio::task::spawn_blocking(move || convert_session_sync(&path, &cfg))
        .await
        .map_err(|e| Snap2PdfError::Internal(format!("Session task panicked: {}", e)))?
}

/// Blocking version of [`convert_session`].
pub fn convert_session_sync(
    manifest_path: impl AsRef<Path>,
    config: &CaptureConfig,
) -> Result<CaptureOutput, Snap2PdfError> {
    let session = RecordedSession::load(manifest_path.as_ref())?;
    let ratio = config.effective_pixel_ratio(session.device_pixel_ratio());
    let captures = session.into_captures()?;
    build_pdf(captures, ratio, config)
}

/// Write `pdf` to `path` atomically, creating parent directories.
pub async fn write_pdf(path: &Path, pdf: &[u8]) -> Result<(), Snap2PdfError> {
    let write_err = |source: std::io::Error| Snap2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, pdf).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    info!("Wrote {} bytes to {}", pdf.len(), path.display());
    Ok(())
}
