//! Recorded capture sessions.
//!
//! A capture driver living elsewhere (a browser extension, a CDP script)
//! can hand its traversal over as a JSON manifest instead of implementing
//! [`crate::capture::CaptureSource`]:
//!
//! ```json
//! {
//!   "devicePixelRatio": 2,
//!   "frames": [
//!     { "image": "step-0.png", "requestedScrollY": 0,   "actualScrollY": 0 },
//!     { "dataUrl": "data:image/png;base64,iVBOR…", "requestedScrollY": 600, "actualScrollY": 400 }
//!   ]
//! }
//! ```
//!
//! Frame images are either paths relative to the manifest or `data:` URLs,
//! the form browser screenshot APIs return. `isLast` may be omitted; it
//! defaults to "this is the final frame in the list". A recorder that was
//! interrupted writes `"isLast": false` on its last frame, and the session
//! is then rejected as incomplete rather than turned into a short PDF.

use crate::error::Snap2PdfError;
use crate::pipeline::reconcile::Capture;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk manifest of one capture traversal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionManifest {
    #[serde(default = "default_pixel_ratio")]
    pub device_pixel_ratio: f64,
    pub frames: Vec<FrameRecord>,
}

/// One captured step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    /// Image file, relative to the manifest's directory.
    #[serde(default)]
    pub image: Option<PathBuf>,
    /// Inline `data:image/...;base64,` image.
    #[serde(default)]
    pub data_url: Option<String>,
    pub requested_scroll_y: f64,
    pub actual_scroll_y: f64,
    #[serde(default)]
    pub is_last: Option<bool>,
}

fn default_pixel_ratio() -> f64 {
    1.0
}

/// A manifest plus the directory its relative image paths resolve against.
#[derive(Debug, Clone)]
pub struct RecordedSession {
    pub manifest: SessionManifest,
    base_dir: PathBuf,
}

impl RecordedSession {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, Snap2PdfError> {
        if !path.exists() {
            return Err(Snap2PdfError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| Snap2PdfError::SessionLoad {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        let manifest: SessionManifest =
            serde_json::from_str(&text).map_err(|e| Snap2PdfError::SessionLoad {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;

        info!(
            "Loaded session {}: {} frames at {}x",
            path.display(),
            manifest.frames.len(),
            manifest.device_pixel_ratio
        );

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self::from_manifest(manifest, base_dir))
    }

    /// Wrap an in-memory manifest.
    pub fn from_manifest(manifest: SessionManifest, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            base_dir: base_dir.into(),
        }
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.manifest.device_pixel_ratio
    }

    /// Decode every frame into a [`Capture`], in manifest order.
    pub fn into_captures(self) -> Result<Vec<Capture>, Snap2PdfError> {
        let last = self.manifest.frames.len().saturating_sub(1);
        self.manifest
            .frames
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let image = load_frame_image(i, frame, &self.base_dir)?;
                Ok(Capture {
                    image,
                    requested_scroll_y: frame.requested_scroll_y,
                    actual_scroll_y: frame.actual_scroll_y,
                    is_last: frame.is_last.unwrap_or(i == last),
                })
            })
            .collect()
    }
}

fn load_frame_image(
    index: usize,
    frame: &FrameRecord,
    base_dir: &Path,
) -> Result<DynamicImage, Snap2PdfError> {
    let decode_err = |detail: String| Snap2PdfError::FrameDecode {
        frame: index,
        detail,
    };

    let bytes = match (&frame.image, &frame.data_url) {
        (Some(path), None) => {
            let full = base_dir.join(path);
            std::fs::read(&full).map_err(|e| decode_err(format!("{}: {}", full.display(), e)))?
        }
        (None, Some(url)) => decode_data_url(url).map_err(decode_err)?,
        (Some(_), Some(_)) => return Err(decode_err("frame has both image and dataUrl".into())),
        (None, None) => return Err(decode_err("frame has neither image nor dataUrl".into())),
    };

    let image = image::load_from_memory(&bytes).map_err(|e| decode_err(e.to_string()))?;
    debug!(
        "Frame {}: {}x{} px",
        index,
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Decode a base64 `data:` URL into its raw bytes.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "not a data: URL".to_string())?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data: URL has no payload".to_string())?;
    if !meta.ends_with(";base64") {
        return Err(format!("unsupported data: URL encoding '{}'", meta));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid base64 payload: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 20, 30])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn data_url(width: u32, height: u32) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(width, height)))
    }

    #[test]
    fn parses_camel_case_manifest() {
        let json = r#"{
            "devicePixelRatio": 2,
            "frames": [
                { "image": "a.png", "requestedScrollY": 0, "actualScrollY": 0 },
                { "dataUrl": "data:image/png;base64,AAAA", "requestedScrollY": 600, "actualScrollY": 400, "isLast": true }
            ]
        }"#;
        let manifest: SessionManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.device_pixel_ratio, 2.0);
        assert_eq!(manifest.frames[0].image.as_deref(), Some(Path::new("a.png")));
        assert_eq!(manifest.frames[1].actual_scroll_y, 400.0);
        assert_eq!(manifest.frames[1].is_last, Some(true));
    }

    #[test]
    fn pixel_ratio_defaults_to_one() {
        let manifest: SessionManifest = serde_json::from_str(r#"{ "frames": [] }"#).unwrap();
        assert_eq!(manifest.device_pixel_ratio, 1.0);
    }

    #[test]
    fn data_url_frames_decode() {
        let manifest = SessionManifest {
            device_pixel_ratio: 1.0,
            frames: vec![
                FrameRecord {
                    image: None,
                    data_url: Some(data_url(8, 6)),
                    requested_scroll_y: 0.0,
                    actual_scroll_y: 0.0,
                    is_last: None,
                },
                FrameRecord {
                    image: None,
                    data_url: Some(data_url(8, 6)),
                    requested_scroll_y: 6.0,
                    actual_scroll_y: 4.0,
                    is_last: None,
                },
            ],
        };
        let captures = RecordedSession::from_manifest(manifest, ".")
            .into_captures()
            .unwrap();
        assert_eq!(captures.len(), 2);
        assert_eq!(captures[0].image.width(), 8);
        assert!(!captures[0].is_last);
        assert!(captures[1].is_last);
        assert_eq!(captures[1].actual_scroll_y, 4.0);
    }

    #[test]
    fn explicit_final_flag_is_kept() {
        let manifest = SessionManifest {
            device_pixel_ratio: 1.0,
            frames: vec![FrameRecord {
                image: None,
                data_url: Some(data_url(4, 4)),
                requested_scroll_y: 0.0,
                actual_scroll_y: 0.0,
                is_last: Some(false),
            }],
        };
        let captures = RecordedSession::from_manifest(manifest, ".")
            .into_captures()
            .unwrap();
        assert!(!captures[0].is_last);
    }

    #[test]
    fn frame_needs_exactly_one_image() {
        let frame = FrameRecord {
            image: None,
            data_url: None,
            requested_scroll_y: 0.0,
            actual_scroll_y: 0.0,
            is_last: None,
        };
        let manifest = SessionManifest {
            device_pixel_ratio: 1.0,
            frames: vec![frame],
        };
        let err = RecordedSession::from_manifest(manifest, ".")
            .into_captures()
            .unwrap_err();
        assert!(matches!(err, Snap2PdfError::FrameDecode { frame: 0, .. }));
    }

    #[test]
    fn data_url_parsing() {
        assert_eq!(decode_data_url("data:image/png;base64,AQID").unwrap(), vec![1, 2, 3]);
        assert!(decode_data_url("http://example.com/a.png").is_err());
        assert!(decode_data_url("data:image/png,raw").is_err());
        assert!(decode_data_url("data:image/png;base64").is_err());
    }

    #[test]
    fn missing_manifest_is_file_not_found() {
        let err = RecordedSession::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Snap2PdfError::FileNotFound { .. }));
    }
}
