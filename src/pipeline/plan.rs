//! Step planning: how many viewport captures a page needs and where each
//! one asks the page to scroll.
//!
//! Offsets are in CSS pixels. Step `i` requests `i * viewport_height`; the
//! browser may clamp the last one, which the reconciler corrects for.

use crate::error::Snap2PdfError;

/// Number of viewport-sized steps needed to cover the page.
///
/// Returns 0 for a page with no height.
pub fn step_count(total_page_height: f64, viewport_height: f64) -> Result<usize, Snap2PdfError> {
    if !viewport_height.is_finite() || viewport_height <= 0.0 {
        return Err(Snap2PdfError::InvalidConfig(format!(
            "Viewport height must be positive, got {}",
            viewport_height
        )));
    }
    if !total_page_height.is_finite() || total_page_height <= 0.0 {
        return Ok(0);
    }
    Ok((total_page_height / viewport_height).ceil() as usize)
}

/// Scroll offset requested for `step`.
pub fn requested_offset(step: usize, viewport_height: f64) -> f64 {
    step as f64 * viewport_height
}
