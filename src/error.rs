//! Error types for the snap2pdf library.
//!
//! Every failure is fatal. A full-page capture that lost a step, or a PDF
//! whose byte offsets cannot be trusted, is not a degraded result but a
//! wrong one, so nothing here is collected and skipped the way a per-page
//! warning would be. The caller decides how to present the failure and
//! cleans up whatever it was holding (temporary files, open tabs).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the snap2pdf library.
#[derive(Debug, Error)]
pub enum Snap2PdfError {
    // ── Capture errors ────────────────────────────────────────────────────
    /// Reconciliation produced zero usable pages.
    ///
    /// Either the capture source yielded nothing at all, or every capture
    /// was fully redundant after cropping.
    #[error("Capture produced no usable pages ({captures} captures received)")]
    EmptyCapture { captures: usize },

    /// The capture sequence stopped before its final step.
    ///
    /// Raised when the traversal was interrupted (tab closed, driver
    /// cancelled). A truncated document is never built from the remainder.
    #[error("Capture sequence is incomplete: {detail} ({captured} captures received)")]
    IncompleteCapture { captured: usize, detail: String },

    /// Requested scroll offsets did not increase from one step to the next.
    #[error("Capture {step} requested offset {requested} after offset {previous}; captures must arrive in step order")]
    OutOfOrderCapture {
        step: usize,
        previous: f64,
        requested: f64,
    },

    /// The capture source failed to scroll or capture a step.
    #[error("Capture failed at step {step}: {detail}")]
    CaptureFailed { step: usize, detail: String },

    /// The page would need more steps than the configured ceiling.
    #[error("Page needs {steps} capture steps, more than the limit of {max}\nRaise --max-steps to capture very long pages.")]
    TooManySteps { steps: usize, max: usize },

    // ── Build errors ──────────────────────────────────────────────────────
    /// Internal invariant violation while encoding or laying out the PDF.
    ///
    /// Always a programming defect or a malformed page image, never a
    /// transient condition.
    #[error("PDF encoding error: {detail}")]
    Encoding { detail: String },

    // ── Session errors ────────────────────────────────────────────────────
    /// A recorded session manifest could not be read or parsed.
    #[error("Failed to load capture session '{path}': {detail}")]
    SessionLoad { path: PathBuf, detail: String },

    /// A frame image inside a recorded session could not be decoded.
    #[error("Failed to decode frame {frame}: {detail}")]
    FrameDecode { frame: usize, detail: String },

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Snap2PdfError {
    /// Shorthand for an [`Snap2PdfError::Encoding`] error.
    pub(crate) fn encoding(detail: impl Into<String>) -> Self {
        Self::Encoding {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_capture_display() {
        let e = Snap2PdfError::EmptyCapture { captures: 0 };
        assert!(e.to_string().contains("no usable pages"), "got: {e}");
    }

    #[test]
    fn incomplete_capture_display() {
        let e = Snap2PdfError::IncompleteCapture {
            captured: 2,
            detail: "last capture is not flagged final".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("incomplete"));
        assert!(msg.contains("2 captures"));
    }

    #[test]
    fn encoding_display() {
        let e = Snap2PdfError::encoding("page 3: image has zero width");
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("zero width"));
    }

    #[test]
    fn too_many_steps_display() {
        let e = Snap2PdfError::TooManySteps { steps: 512, max: 200 };
        assert!(e.to_string().contains("512"));
        assert!(e.to_string().contains("200"));
    }
}
