//! Configuration types for full-page capture and PDF assembly.
//!
//! Every knob lives in [`CaptureConfig`], built via its
//! [`CaptureConfigBuilder`]. Setters clamp obviously out-of-range values;
//! `build()` rejects the ones that cannot be clamped into something
//! meaningful (a non-finite page width, a sub-1.0 pixel ratio).

use crate::error::Snap2PdfError;
use crate::progress::ProgressCallback;
use std::fmt;

/// ISO A4 width in PDF points.
pub const A4_WIDTH_POINTS: f64 = 595.28;

/// Configuration for a capture-to-PDF run.
///
/// # Example
/// ```rust
/// use snap2pdf::CaptureConfig;
///
/// let config = CaptureConfig::builder()
///     .jpeg_quality(85)
///     .settle_delay_ms(250)
///     .build()
///     .unwrap();
/// assert_eq!(config.jpeg_quality, 85);
/// ```
#[derive(Clone)]
pub struct CaptureConfig {
    /// Width of every PDF page in points. Default: 595.28 (A4).
    ///
    /// Page heights follow from each image's aspect ratio, so only the
    /// width is fixed.
    pub page_width_points: f64,

    /// JPEG quality for page images, 1–100. Default: 92.
    pub jpeg_quality: u8,

    /// Device pixel ratio override. Default: None (use the source's value).
    ///
    /// Converts CSS-pixel scroll discrepancies into raster rows when
    /// cropping overlapping captures.
    pub device_pixel_ratio: Option<f64>,

    /// Delay between scrolling and capturing, in milliseconds. Default: 150.
    ///
    /// Lazy-loaded images and sticky headers need a moment to settle after
    /// each scroll before the viewport is captured.
    pub settle_delay_ms: u64,

    /// Upper bound on capture steps for one page. Default: 200.
    pub max_steps: usize,

    /// Scroll the page back to where it started once capture ends. Default: true.
    pub restore_scroll: bool,

    /// Optional per-step progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            page_width_points: A4_WIDTH_POINTS,
            jpeg_quality: 92,
            device_pixel_ratio: None,
            settle_delay_ms: 150,
            max_steps: 200,
            restore_scroll: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CaptureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureConfig")
            .field("page_width_points", &self.page_width_points)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("device_pixel_ratio", &self.device_pixel_ratio)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("max_steps", &self.max_steps)
            .field("restore_scroll", &self.restore_scroll)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn CaptureProgressCallback>"),
            )
            .finish()
    }
}

impl CaptureConfig {
    /// Create a new builder for `CaptureConfig`.
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder {
            config: Self::default(),
        }
    }

    /// Pick the pixel ratio to crop with: the override if set, else `reported`.
    pub fn effective_pixel_ratio(&self, reported: f64) -> f64 {
        self.device_pixel_ratio.unwrap_or(reported)
    }
}

/// Builder for [`CaptureConfig`].
#[derive(Debug)]
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    pub fn page_width_points(mut self, points: f64) -> Self {
        self.config.page_width_points = points;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.config.device_pixel_ratio = Some(ratio);
        self
    }

    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    pub fn max_steps(mut self, n: usize) -> Self {
        self.config.max_steps = n.max(1);
        self
    }

    pub fn restore_scroll(mut self, v: bool) -> Self {
        self.config.restore_scroll = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CaptureConfig, Snap2PdfError> {
        let c = &self.config;
        if !c.page_width_points.is_finite() || c.page_width_points <= 0.0 {
            return Err(Snap2PdfError::InvalidConfig(format!(
                "Page width must be a positive number of points, got {}",
                c.page_width_points
            )));
        }
        if let Some(ratio) = c.device_pixel_ratio {
            validate_pixel_ratio(ratio)?;
        }
        Ok(self.config)
    }
}

/// Reject pixel ratios that cannot describe a real display.
pub fn validate_pixel_ratio(ratio: f64) -> Result<(), Snap2PdfError> {
    if !ratio.is_finite() || ratio < 1.0 {
        return Err(Snap2PdfError::InvalidConfig(format!(
            "Device pixel ratio must be a finite number ≥ 1, got {}",
            ratio
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_a4_and_valid() {
        let config = CaptureConfig::builder().build().unwrap();
        assert_eq!(config.page_width_points, A4_WIDTH_POINTS);
        assert_eq!(config.jpeg_quality, 92);
        assert!(config.device_pixel_ratio.is_none());
        assert!(config.restore_scroll);
    }

    #[test]
    fn quality_is_clamped() {
        let config = CaptureConfig::builder().jpeg_quality(0).build().unwrap();
        assert_eq!(config.jpeg_quality, 1);
        let config = CaptureConfig::builder().jpeg_quality(250).build().unwrap();
        assert_eq!(config.jpeg_quality, 100);
    }

    #[test]
    fn zero_max_steps_becomes_one() {
        let config = CaptureConfig::builder().max_steps(0).build().unwrap();
        assert_eq!(config.max_steps, 1);
    }

    #[test]
    fn rejects_bad_page_width() {
        for w in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let err = CaptureConfig::builder().page_width_points(w).build();
            assert!(
                matches!(err, Err(Snap2PdfError::InvalidConfig(_))),
                "width {w} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_sub_unit_pixel_ratio() {
        let err = CaptureConfig::builder().device_pixel_ratio(0.5).build();
        assert!(matches!(err, Err(Snap2PdfError::InvalidConfig(_))));
    }

    #[test]
    fn override_wins_over_reported_ratio() {
        let config = CaptureConfig::builder()
            .device_pixel_ratio(2.0)
            .build()
            .unwrap();
        assert_eq!(config.effective_pixel_ratio(1.0), 2.0);
        assert_eq!(CaptureConfig::default().effective_pixel_ratio(1.5), 1.5);
    }

    #[test]
    fn debug_hides_callback() {
        let dbg = format!("{:?}", CaptureConfig::default());
        assert!(dbg.contains("jpeg_quality"));
        assert!(dbg.contains("progress_callback: None"));
    }
}
