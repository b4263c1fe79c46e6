//! Upload validation and decoding.
//!
//! Uploads arrive as a raw byte buffer plus a declared content type. Only
//! JPEG and PNG are accepted; everything else is rejected before any decode
//! work happens, as is anything over the configured size ceiling.

use std::path::Path;

use image::{ImageFormat, RgbImage};

use crate::error::{Error, Result};

/// Default upload size ceiling: 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// The two raster formats accepted for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// JPEG (`image/jpeg`).
    Jpeg,
    /// PNG (`image/png`).
    Png,
}

impl ImageKind {
    /// Parse a declared MIME content type.
    ///
    /// Accepts `image/jpeg`, `image/jpg` (a common browser quirk) and
    /// `image/png`, case-insensitively. Returns `None` for anything else.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.trim().to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Infer the kind from a file extension (`jpg`, `jpeg`, `png`).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => match ext.to_lowercase().as_str() {
                "jpg" | "jpeg" => Some(Self::Jpeg),
                "png" => Some(Self::Png),
                _ => None,
            },
            None => None,
        }
    }

    /// The corresponding decoder format.
    #[must_use]
    pub fn format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }

    /// The canonical MIME content type for this kind.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Validate and decode an uploaded byte buffer into an RGB pixel grid.
///
/// The declared content type is enforced: PNG bytes declared as JPEG fail to
/// decode and are reported as corrupt rather than silently re-sniffed.
///
/// # Errors
///
/// - [`Error::UploadTooLarge`] if `bytes.len() > max_bytes` (checked before
///   any decode work).
/// - [`Error::UnsupportedFormat`] if the declared type is not JPEG or PNG.
/// - [`Error::CorruptImage`] if the buffer is empty or does not decode as
///   the declared format.
pub fn decode_upload(bytes: &[u8], content_type: &str, max_bytes: usize) -> Result<RgbImage> {
    if bytes.len() > max_bytes {
        return Err(Error::UploadTooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }
    if bytes.is_empty() {
        return Err(Error::CorruptImage("empty upload".to_string()));
    }

    let kind = ImageKind::from_content_type(content_type)
        .ok_or_else(|| Error::UnsupportedFormat(content_type.to_string()))?;

    let img = image::load_from_memory_with_format(bytes, kind.format())
        .map_err(|e| Error::CorruptImage(e.to_string()))?;

    Ok(img.to_rgb8())
}
