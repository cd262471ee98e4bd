//! Capture reconciliation: raw viewport captures → non-overlapping frames.
//!
//! Browsers clamp scroll requests near the bottom of a page, so the last
//! capture usually re-shows a band the previous capture already covered.
//! The band's size is measured, not assumed: it is the gap between the
//! offset a step asked for and the offset the page actually reached,
//! converted from CSS pixels to raster rows with the device pixel ratio.
//! That many rows are cut off the top of the capture.
//!
//! Everything here is pure. Stacking the returned frames top to bottom
//! reproduces the page with no duplicated rows, provided actual offsets
//! never decrease.

use crate::config::validate_pixel_ratio;
use crate::error::Snap2PdfError;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

/// One raw viewport capture taken during page traversal.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Captured viewport, in device pixels.
    pub image: DynamicImage,
    /// Offset the driver asked the page to scroll to, in CSS pixels.
    pub requested_scroll_y: f64,
    /// Offset the page reported after scrolling, in CSS pixels.
    pub actual_scroll_y: f64,
    /// Whether this is the final capture of the traversal.
    pub is_last: bool,
}

/// A capture after cropping, ready to be encoded as one PDF page.
#[derive(Debug, Clone)]
pub struct ReconciledFrame {
    /// Index of the capture this frame came from.
    pub step: usize,
    /// Cropped raster.
    pub image: DynamicImage,
    /// Rows removed from the top of the raw capture.
    pub cropped_rows: u32,
}

/// Result of [`reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Frames in page order. Never empty.
    pub frames: Vec<ReconciledFrame>,
    /// Steps whose capture was entirely redundant.
    pub dropped_steps: Vec<usize>,
    /// Total rows cropped across all frames.
    pub cropped_rows: u64,
}

/// Rows to cut off the top of a capture whose scroll was clamped.
///
/// `overlap = requested − actual` in CSS pixels; a non-positive overlap
/// means the page scrolled as far as asked and nothing is cropped.
pub fn cropped_rows(requested_scroll_y: f64, actual_scroll_y: f64, device_pixel_ratio: f64) -> u32 {
    let overlap = requested_scroll_y - actual_scroll_y;
    if overlap > 0.0 {
        (overlap * device_pixel_ratio).round() as u32
    } else {
        0
    }
}

/// Turn an ordered capture sequence into non-overlapping frames.
///
/// # Errors
/// * [`Snap2PdfError::EmptyCapture`] — no captures, or none left after cropping
/// * [`Snap2PdfError::IncompleteCapture`] — the sequence does not end with
///   its final capture (interrupted traversal)
/// * [`Snap2PdfError::OutOfOrderCapture`] — requested offsets do not increase
pub fn reconcile(
    captures: Vec<Capture>,
    device_pixel_ratio: f64,
) -> Result<Reconciled, Snap2PdfError> {
    validate_pixel_ratio(device_pixel_ratio)?;

    let total = captures.len();
    if total == 0 {
        return Err(Snap2PdfError::EmptyCapture { captures: 0 });
    }
    check_sequence(&captures)?;

    let mut frames = Vec::with_capacity(total);
    let mut dropped_steps = Vec::new();
    let mut cropped_total = 0u64;

    for (step, capture) in captures.into_iter().enumerate() {
        let (width, height) = capture.image.dimensions();
        let rows = if step == 0 {
            0
        } else {
            cropped_rows(
                capture.requested_scroll_y,
                capture.actual_scroll_y,
                device_pixel_ratio,
            )
        };

        if rows >= height || width == 0 {
            warn!(
                "Dropping capture {} ({}x{} px, {} rows overlap the previous capture)",
                step, width, height, rows
            );
            dropped_steps.push(step);
            continue;
        }

        let image = if rows > 0 {
            debug!("Capture {}: cropping {} of {} rows", step, rows, height);
            capture.image.crop_imm(0, rows, width, height - rows)
        } else {
            capture.image
        };

        cropped_total += u64::from(rows);
        frames.push(ReconciledFrame {
            step,
            image,
            cropped_rows: rows,
        });
    }

    if frames.is_empty() {
        return Err(Snap2PdfError::EmptyCapture { captures: total });
    }

    debug!(
        "Reconciled {} captures into {} frames ({} dropped)",
        total,
        frames.len(),
        dropped_steps.len()
    );

    Ok(Reconciled {
        frames,
        dropped_steps,
        cropped_rows: cropped_total,
    })
}

/// Reject sequences that were cut short or arrived out of step order.
fn check_sequence(captures: &[Capture]) -> Result<(), Snap2PdfError> {
    let total = captures.len();

    match captures.iter().position(|c| c.is_last) {
        None => {
            return Err(Snap2PdfError::IncompleteCapture {
                captured: total,
                detail: "no capture is flagged as the final step".into(),
            })
        }
        Some(idx) if idx + 1 != total => {
            return Err(Snap2PdfError::IncompleteCapture {
                captured: total,
                detail: format!("capture {} is flagged final but more follow", idx),
            })
        }
        Some(_) => {}
    }

    for (step, pair) in captures.windows(2).enumerate() {
        let (previous, requested) = (pair[0].requested_scroll_y, pair[1].requested_scroll_y);
        if requested <= previous {
            return Err(Snap2PdfError::OutOfOrderCapture {
                step: step + 1,
                previous,
                requested,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// A capture whose every row is painted with `(first_row + y) % 256`,
    /// so crops can be checked by reading the top-left pixel.
    fn striped(width: u32, height: u32, first_row: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, y| {
            let v = ((first_row + y) % 256) as u8;
            Rgb([v, v, v])
        }))
    }

    fn capture(height: u32, requested: f64, actual: f64, is_last: bool) -> Capture {
        Capture {
            image: striped(8, height, 0),
            requested_scroll_y: requested,
            actual_scroll_y: actual,
            is_last,
        }
    }

    #[test]
    fn crop_rows_scale_with_pixel_ratio() {
        assert_eq!(cropped_rows(600.0, 400.0, 1.0), 200);
        assert_eq!(cropped_rows(1200.0, 1150.0, 2.0), 100);
        assert_eq!(cropped_rows(100.0, 99.7, 1.5), 0);
        assert_eq!(cropped_rows(100.0, 99.6, 1.5), 1);
    }

    #[test]
    fn no_crop_without_clamping() {
        assert_eq!(cropped_rows(600.0, 600.0, 2.0), 0);
        assert_eq!(cropped_rows(600.0, 620.0, 2.0), 0);
    }

    #[test]
    fn unclamped_sequence_keeps_full_height() {
        let captures = vec![
            capture(600, 0.0, 0.0, false),
            capture(600, 600.0, 600.0, false),
            capture(600, 1200.0, 1200.0, true),
        ];
        let out = reconcile(captures, 1.0).unwrap();
        assert_eq!(out.frames.len(), 3);
        assert!(out.frames.iter().all(|f| f.image.height() == 600));
        assert!(out.dropped_steps.is_empty());
        assert_eq!(out.cropped_rows, 0);
    }

    #[test]
    fn clamped_last_step_is_cropped_from_the_top() {
        let captures = vec![
            capture(1200, 0.0, 0.0, false),
            capture(1200, 600.0, 600.0, false),
            capture(1200, 1200.0, 1150.0, true),
        ];
        let out = reconcile(captures, 2.0).unwrap();
        let last = &out.frames[2];
        assert_eq!(last.cropped_rows, 100);
        assert_eq!(last.image.height(), 1100);
        // The first surviving row is raw row 100.
        assert_eq!(last.image.to_rgb8().get_pixel(0, 0), &Rgb([100, 100, 100]));
    }

    #[test]
    fn first_step_is_never_cropped() {
        let captures = vec![capture(600, 50.0, 0.0, true)];
        let out = reconcile(captures, 1.0).unwrap();
        assert_eq!(out.frames[0].image.height(), 600);
        assert_eq!(out.frames[0].cropped_rows, 0);
    }

    #[test]
    fn fully_redundant_step_is_dropped() {
        let captures = vec![
            capture(600, 0.0, 0.0, false),
            capture(600, 600.0, 400.0, false),
            capture(600, 1200.0, 400.0, true),
        ];
        let out = reconcile(captures, 1.0).unwrap();
        assert_eq!(out.frames.len(), 2);
        assert_eq!(out.dropped_steps, vec![2]);
        assert_eq!(out.frames[1].image.height(), 400);
    }

    #[test]
    fn no_captures_is_empty_capture() {
        let err = reconcile(Vec::new(), 1.0).unwrap_err();
        assert!(matches!(err, Snap2PdfError::EmptyCapture { captures: 0 }));
    }

    #[test]
    fn only_blank_captures_is_empty_capture() {
        let captures = vec![capture(0, 0.0, 0.0, true)];
        let err = reconcile(captures, 1.0).unwrap_err();
        assert!(matches!(err, Snap2PdfError::EmptyCapture { captures: 1 }));
    }

    #[test]
    fn truncated_sequence_is_incomplete() {
        let captures = vec![
            capture(600, 0.0, 0.0, false),
            capture(600, 600.0, 600.0, false),
        ];
        let err = reconcile(captures, 1.0).unwrap_err();
        assert!(matches!(err, Snap2PdfError::IncompleteCapture { captured: 2, .. }));
    }

    #[test]
    fn early_final_flag_is_incomplete() {
        let captures = vec![
            capture(600, 0.0, 0.0, true),
            capture(600, 600.0, 600.0, true),
        ];
        let err = reconcile(captures, 1.0).unwrap_err();
        assert!(matches!(err, Snap2PdfError::IncompleteCapture { .. }));
    }

    #[test]
    fn decreasing_offsets_are_rejected() {
        let captures = vec![
            capture(600, 600.0, 600.0, false),
            capture(600, 0.0, 0.0, true),
        ];
        let err = reconcile(captures, 1.0).unwrap_err();
        assert!(matches!(err, Snap2PdfError::OutOfOrderCapture { step: 1, .. }));
    }

    #[test]
    fn invalid_pixel_ratio_is_rejected() {
        let captures = vec![capture(600, 0.0, 0.0, true)];
        assert!(matches!(
            reconcile(captures, 0.0),
            Err(Snap2PdfError::InvalidConfig(_))
        ));
    }
}
