//! Minimal PDF writer for image-only documents.
//!
//! * [`objects`]: object numbering, the single source of object ids
//! * [`writer`]: byte accumulator that records xref offsets as it goes
//! * [`builder`]: assembles catalog, page tree and per-page objects

pub mod builder;
pub mod objects;
pub mod writer;

pub use builder::{build_document, format_number, page_height_points};
pub use objects::{object_id_for, ObjectRole};
pub use writer::PdfWriter;
