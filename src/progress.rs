//! Progress-callback trait for per-step capture events.
//!
//! Inject an [`Arc<dyn CaptureProgressCallback>`] via
//! [`crate::config::CaptureConfigBuilder::progress_callback`] to follow a
//! capture as it scrolls through the page. The CLI drives its progress bar
//! from these events; library callers can forward them anywhere.
//!
//! # Example
//!
//! ```rust
//! use snap2pdf::{CaptureConfig, CaptureProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct StepCounter {
//!     steps: AtomicUsize,
//! }
//!
//! impl CaptureProgressCallback for StepCounter {
//!     fn on_step_captured(&self, step: usize, total_steps: usize) {
//!         self.steps.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("captured {}/{}", step + 1, total_steps);
//!     }
//! }
//!
//! let counter = Arc::new(StepCounter { steps: AtomicUsize::new(0) });
//!
//! let config = CaptureConfig::builder()
//!     .progress_callback(counter as Arc<dyn CaptureProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the capture driver and the PDF build as they progress.
///
/// All methods have default no-op implementations so callers only
/// override what they care about. Steps are always reported in order;
/// capture is sequential.
pub trait CaptureProgressCallback: Send + Sync {
    /// Called once the page has been measured, before the first scroll.
    fn on_capture_start(&self, total_steps: usize) {
        let _ = total_steps;
    }

    /// Called after each viewport capture.
    ///
    /// # Arguments
    /// * `step`        — 0-indexed step number
    /// * `total_steps` — number of steps planned for the page
    fn on_step_captured(&self, step: usize, total_steps: usize) {
        let _ = (step, total_steps);
    }

    /// Called when a capture turned out to be fully redundant after cropping.
    fn on_page_dropped(&self, step: usize) {
        let _ = step;
    }

    /// Called once the PDF has been assembled.
    ///
    /// # Arguments
    /// * `pages`     — pages in the finished document
    /// * `pdf_bytes` — size of the document in bytes
    fn on_build_complete(&self, pages: usize, pdf_bytes: usize) {
        let _ = (pages, pdf_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl CaptureProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::CaptureConfig`].
pub type ProgressCallback = Arc<dyn CaptureProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        planned: AtomicUsize,
        captured: AtomicUsize,
        dropped: AtomicUsize,
        pages: AtomicUsize,
    }

    impl CaptureProgressCallback for TrackingCallback {
        fn on_capture_start(&self, total_steps: usize) {
            self.planned.store(total_steps, Ordering::SeqCst);
        }

        fn on_step_captured(&self, _step: usize, _total_steps: usize) {
            self.captured.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_dropped(&self, _step: usize) {
            self.dropped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_build_complete(&self, pages: usize, _pdf_bytes: usize) {
            self.pages.store(pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_capture_start(3);
        cb.on_step_captured(0, 3);
        cb.on_page_dropped(2);
        cb.on_build_complete(2, 1024);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_capture_start(3);
        for step in 0..3 {
            tracker.on_step_captured(step, 3);
        }
        tracker.on_page_dropped(2);
        tracker.on_build_complete(2, 4096);

        assert_eq!(tracker.planned.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.captured.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.dropped.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.pages.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_capture_start(1);
        cb.on_step_captured(0, 1);
    }
}
