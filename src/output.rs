//! Result types returned by the conversion entry points.

use crate::capture::PageMetrics;
use serde::{Deserialize, Serialize};

/// A finished capture-to-PDF run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureOutput {
    /// The PDF document.
    #[serde(skip)]
    pub pdf: Vec<u8>,
    /// One entry per PDF page, in page order.
    pub pages: Vec<PageSummary>,
    pub stats: CaptureStats,
    /// Page geometry measured before a live capture; absent for recorded
    /// sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PageMetrics>,
}

/// What ended up on one PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Capture step the page came from (0-indexed).
    pub source_step: usize,
    pub width_px: u32,
    pub height_px: u32,
    /// Rows cropped off the top of the raw capture.
    pub cropped_rows: u32,
    /// Page height in points at the configured page width.
    pub height_points: f64,
    /// Size of the embedded JPEG.
    pub image_bytes: usize,
}

/// Counters and timings for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureStats {
    /// Captures received from the source.
    pub captures: usize,
    /// Pages in the PDF.
    pub pages: usize,
    /// Captures dropped as fully redundant.
    pub dropped_captures: usize,
    /// Rows cropped across all pages.
    pub cropped_rows: u64,
    pub pdf_bytes: usize,
    /// Time spent scrolling and capturing; 0 for recorded sessions.
    pub capture_duration_ms: u64,
    /// Time spent cropping, encoding and assembling.
    pub build_duration_ms: u64,
    pub total_duration_ms: u64,
}
