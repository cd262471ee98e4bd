//! Pipeline stages for capture-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step and can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! plan ──▶ (capture driver) ──▶ reconcile ──▶ encode ──▶ pdf::build_document
//! (steps)   (scroll+capture)     (crop)        (JPEG)      (bytes)
//! ```
//!
//! 1. [`plan`]      — step count and requested scroll offsets
//! 2. [`reconcile`] — crop clamped captures so frames never overlap
//! 3. [`encode`]    — flatten to RGB and JPEG-encode each frame

pub mod encode;
pub mod plan;
pub mod reconcile;
