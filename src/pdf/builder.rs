//! Minimal image-only PDF assembly.
//!
//! Produces a PDF 1.4 file with one JPEG per page and nothing else: no
//! fonts, no text, no compression beyond the JPEG itself. Every page shares
//! the same width in points; its height follows the image's aspect ratio.
//!
//! Output is a pure function of the input: no timestamps, no document ID,
//! no `/Info` dictionary.

use super::objects::{
    highest_object_id, image_resource_name, object_id_for, ObjectRole, CATALOG_ID, PAGES_ID,
};
use super::writer::PdfWriter;
use crate::error::Snap2PdfError;
use crate::pipeline::encode::PageImage;
use tracing::debug;

/// Version line plus a binary comment so transfer tools treat the file as binary.
const PDF_HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";

/// JPEG start-of-image marker.
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Build a complete PDF from page images.
///
/// Each page is `page_width_points` wide and
/// `page_width_points * height / width` tall, showing its image edge to edge.
///
/// # Errors
/// [`Snap2PdfError::Encoding`] if `pages` is empty, the width is not a
/// positive finite number, or any page has a zero dimension, no bytes, or
/// bytes that are not JPEG data.
pub fn build_document(pages: &[PageImage], page_width_points: f64) -> Result<Vec<u8>, Snap2PdfError> {
    validate(pages, page_width_points)?;

    let mut w = PdfWriter::new(highest_object_id(pages.len()));
    w.emit(PDF_HEADER);

    w.write_object(
        CATALOG_ID,
        &format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID),
    )?;

    let kids = (0..pages.len())
        .map(|i| format!("{} 0 R", object_id_for(i, ObjectRole::Page)))
        .collect::<Vec<_>>()
        .join(" ");
    w.write_object(
        PAGES_ID,
        &format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()),
    )?;

    for (i, page) in pages.iter().enumerate() {
        write_page(&mut w, i, page, page_width_points)?;
    }

    let pdf = w.finish(CATALOG_ID)?;
    debug!("Assembled PDF: {} pages, {} bytes", pages.len(), pdf.len());
    Ok(pdf)
}

/// Height in points of a page showing `page` at `page_width_points` wide.
pub fn page_height_points(page: &PageImage, page_width_points: f64) -> f64 {
    page_width_points * (f64::from(page.height) / f64::from(page.width))
}

/// Fixed two-decimal rendering used for every coordinate in the file.
pub fn format_number(value: f64) -> String {
    format!("{:.2}", value)
}

/// Emit the image, content stream and page objects for page `index`.
fn write_page(
    w: &mut PdfWriter,
    index: usize,
    page: &PageImage,
    page_width_points: f64,
) -> Result<(), Snap2PdfError> {
    let image_id = object_id_for(index, ObjectRole::Image);
    let content_id = object_id_for(index, ObjectRole::Content);
    let page_id = object_id_for(index, ObjectRole::Page);
    let name = image_resource_name(index);

    let width = format_number(page_width_points);
    let height = format_number(page_height_points(page, page_width_points));

    w.write_stream_object(
        image_id,
        &format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
            page.width, page.height
        ),
        &page.bytes,
    )?;

    let content = format!("q\n{} 0 0 {} 0 0 cm\n/{} Do\nQ\n", width, height, name);
    w.write_stream_object(content_id, "", content.as_bytes())?;

    w.write_object(
        page_id,
        &format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Contents {} 0 R \
             /Resources << /XObject << /{} {} 0 R >> >> >>",
            PAGES_ID, width, height, content_id, name, image_id
        ),
    )
}

fn validate(pages: &[PageImage], page_width_points: f64) -> Result<(), Snap2PdfError> {
    if pages.is_empty() {
        return Err(Snap2PdfError::encoding("document has no pages"));
    }
    if !page_width_points.is_finite() || page_width_points <= 0.0 {
        return Err(Snap2PdfError::encoding(format!(
            "page width must be positive, got {}",
            page_width_points
        )));
    }
    if rounds_to_zero(page_width_points) {
        return Err(Snap2PdfError::encoding(format!(
            "page width {} rounds to {} points",
            page_width_points,
            format_number(page_width_points)
        )));
    }
    for (i, page) in pages.iter().enumerate() {
        if page.width == 0 || page.height == 0 {
            return Err(Snap2PdfError::encoding(format!(
                "page {}: image is {}x{} px",
                i + 1,
                page.width,
                page.height
            )));
        }
        if page.bytes.is_empty() {
            return Err(Snap2PdfError::encoding(format!(
                "page {}: image has no data",
                i + 1
            )));
        }
        if !page.bytes.starts_with(&JPEG_SOI) {
            return Err(Snap2PdfError::encoding(format!(
                "page {}: image data is not JPEG",
                i + 1
            )));
        }
        let height = page_height_points(page, page_width_points);
        if rounds_to_zero(height) {
            return Err(Snap2PdfError::encoding(format!(
                "page {}: {}x{} px at {} points wide gives a page height of {}",
                i + 1,
                page.width,
                page.height,
                format_number(page_width_points),
                format_number(height)
            )));
        }
    }
    Ok(())
}

/// A dimension that prints as `0.00` would give a zero-area media box.
fn rounds_to_zero(value: f64) -> bool {
    format_number(value)
        .parse::<f64>()
        .map_or(true, |v| v <= 0.0)
}
