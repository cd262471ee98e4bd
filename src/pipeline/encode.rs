//! Image encoding: cropped `DynamicImage` → JPEG [`PageImage`].
//!
//! JPEG is the one image encoding the PDF writer embeds: its bytes go into
//! the file verbatim under `/DCTDecode`, so no PDF-side compression code is
//! needed. Frames are flattened to 8-bit RGB first because the image
//! XObject declares `/DeviceRGB`; an alpha channel from a PNG screenshot
//! would otherwise leak into a four-component JPEG.

use crate::error::Snap2PdfError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use tracing::debug;

/// A compressed page image with its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// JPEG-encoded image data.
    pub bytes: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// JPEG-encode one frame at the given quality (1–100).
///
/// `page` is the 1-indexed page number, used for error context only.
pub fn encode_page(img: &DynamicImage, quality: u8, page: usize) -> Result<PageImage, Snap2PdfError> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(Snap2PdfError::encoding(format!(
            "page {}: cannot encode an empty {}x{} frame",
            page, width, height
        )));
    }

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| Snap2PdfError::encoding(format!("page {}: JPEG encoding failed: {}", page, e)))?;

    debug!(
        "Encoded page {} ({}x{} px) → {} bytes JPEG",
        page,
        width,
        height,
        bytes.len()
    );

    Ok(PageImage {
        bytes,
        width,
        height,
    })
}
