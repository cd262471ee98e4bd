//! Simulated page: a full-page raster behind a scrolling viewport.
//!
//! [`StitchedImageSource`] behaves the way a browser tab does as far as the
//! capture driver can tell. Scroll requests past the bottom are clamped to
//! `total − viewport`, and each capture is the band of the raster under the
//! viewport. Feeding a long screenshot through it exercises the full
//! clamp-and-crop path, which is what the CLI's image mode and the
//! integration tests rely on.

use crate::capture::{CaptureSource, PageMetrics};
use crate::config::validate_pixel_ratio;
use crate::error::Snap2PdfError;
use image::DynamicImage;

/// A page backed by one tall raster.
#[derive(Debug, Clone)]
pub struct StitchedImageSource {
    page: DynamicImage,
    viewport_height: f64,
    device_pixel_ratio: f64,
    scroll_y: f64,
}

impl StitchedImageSource {
    /// Wrap `page` (device pixels) as a document viewed through a viewport
    /// `viewport_height` CSS pixels tall.
    pub fn new(
        page: DynamicImage,
        viewport_height: f64,
        device_pixel_ratio: f64,
    ) -> Result<Self, Snap2PdfError> {
        validate_pixel_ratio(device_pixel_ratio)?;
        if !viewport_height.is_finite() || viewport_height <= 0.0 {
            return Err(Snap2PdfError::InvalidConfig(format!(
                "Viewport height must be positive, got {}",
                viewport_height
            )));
        }
        Ok(Self {
            page,
            viewport_height,
            device_pixel_ratio,
            scroll_y: 0.0,
        })
    }

    /// Current scroll offset in CSS pixels.
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn total_height(&self) -> f64 {
        f64::from(self.page.height()) / self.device_pixel_ratio
    }

    fn max_scroll(&self) -> f64 {
        (self.total_height() - self.viewport_height).max(0.0)
    }
}

impl CaptureSource for StitchedImageSource {
    async fn metrics(&mut self) -> Result<PageMetrics, Snap2PdfError> {
        Ok(PageMetrics {
            viewport_width: f64::from(self.page.width()) / self.device_pixel_ratio,
            viewport_height: self.viewport_height,
            total_height: self.total_height(),
            device_pixel_ratio: self.device_pixel_ratio,
            initial_scroll_y: self.scroll_y,
        })
    }

    async fn scroll_to(&mut self, y: f64) -> Result<f64, Snap2PdfError> {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
        Ok(self.scroll_y)
    }

    async fn capture_viewport(&mut self) -> Result<DynamicImage, Snap2PdfError> {
        let page_rows = self.page.height();
        let top = ((self.scroll_y * self.device_pixel_ratio).round() as u32).min(page_rows);
        let rows = ((self.viewport_height * self.device_pixel_ratio).round() as u32)
            .min(page_rows - top);
        Ok(self.page.crop_imm(0, top, self.page.width(), rows))
    }
}
