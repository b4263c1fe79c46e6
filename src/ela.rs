//! Error Level Analysis.
//!
//! JPEG compression leaves a near-uniform error floor across an image that
//! was saved once. Re-encoding at a known quality and differencing against
//! the original exposes regions whose error level is inconsistent with the
//! rest of the image — the signature of content pasted or edited after the
//! last save. The amplified difference map is what the classifier consumes.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageFormat, RgbImage};

use crate::error::Result;

/// JPEG quality used for the re-encode pass.
///
/// Matches the quality most consumer documents were last saved at closely
/// enough that genuine regions difference to near zero.
pub const ELA_QUALITY: u8 = 90;

/// Fixed amplification applied to the raw per-pixel difference.
///
/// Raw recompression differences rarely exceed a dozen levels; scaling by a
/// fixed factor keeps the map deterministic across inputs (unlike per-image
/// max normalization) while bringing tampering artifacts into a range the
/// classifier can separate.
pub const ELA_SCALE: f32 = 20.0;

/// Compute the amplified Error-Level-Analysis map for a decoded image.
///
/// Re-encodes `original` as JPEG at `quality`, decodes it back, and returns
/// the per-pixel, per-channel absolute difference scaled by `scale` and
/// clamped to the valid pixel range. The output has the same dimensions as
/// the input. Deterministic: identical input always yields an identical map.
///
/// # Errors
///
/// Returns [`crate::Error::Image`] if the in-memory re-encode or decode
/// fails (not expected for any image that itself decoded successfully).
pub fn compute_ela(original: &RgbImage, quality: u8, scale: f32) -> Result<RgbImage> {
    let (width, height) = original.dimensions();

    let mut recompressed_bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut recompressed_bytes), quality);
    encoder.encode(original.as_raw(), width, height, ExtendedColorType::Rgb8)?;

    let recompressed =
        image::load_from_memory_with_format(&recompressed_bytes, ImageFormat::Jpeg)?.to_rgb8();

    let mut ela = RgbImage::new(width, height);
    for (ela_px, (orig_px, recomp_px)) in ela
        .pixels_mut()
        .zip(original.pixels().zip(recompressed.pixels()))
    {
        for c in 0..3 {
            let diff = f32::from(orig_px[c].abs_diff(recomp_px[c]));
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let amplified = (diff * scale).clamp(0.0, 255.0) as u8;
            ela_px[c] = amplified;
        }
    }

    Ok(ela)
}

/// Mean value of an ELA map across all pixels and channels, in `[0, 255]`.
///
/// Useful as a coarse energy measure: a uniformly-compressed image sits near
/// zero, tampered regions push the mean up.
#[must_use]
pub fn mean_level(ela: &RgbImage) -> f32 {
    let total: u64 = ela.as_raw().iter().map(|&v| u64::from(v)).sum();
    let count = ela.as_raw().len();
    if count == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = total as f32 / count as f32;
    mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{gradient_image, recompressed, with_noise_patch};

    #[test]
    fn ela_preserves_dimensions() {
        let img = gradient_image(60, 44);
        let ela = compute_ela(&img, ELA_QUALITY, ELA_SCALE).unwrap();
        assert_eq!(ela.dimensions(), (60, 44));
    }

    #[test]
    fn ela_is_deterministic() {
        let img = gradient_image(64, 64);
        let a = compute_ela(&img, ELA_QUALITY, ELA_SCALE).unwrap();
        let b = compute_ela(&img, ELA_QUALITY, ELA_SCALE).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn flat_image_has_near_zero_error_level() {
        // A solid color survives JPEG essentially untouched.
        let img = RgbImage::from_pixel(64, 64, image::Rgb([128, 128, 128]));
        let ela = compute_ela(&img, ELA_QUALITY, 1.0).unwrap();
        assert!(mean_level(&ela) < 1.0, "got mean {}", mean_level(&ela));
    }

    #[test]
    fn recompressed_image_has_lower_error_than_tampered_copy() {
        // The §8-style anchor: an image already saved at Q90 differences to a
        // low floor; pasting uncompressed noise into it raises the error.
        let base = recompressed(&gradient_image(128, 128), ELA_QUALITY);
        let tampered = with_noise_patch(&base, 48, 48, 32);

        // Unit scale so clamping cannot mask the gap.
        let base_mean = mean_level(&compute_ela(&base, ELA_QUALITY, 1.0).unwrap());
        let tampered_mean = mean_level(&compute_ela(&tampered, ELA_QUALITY, 1.0).unwrap());

        assert!(
            tampered_mean > base_mean,
            "tampered mean {tampered_mean} should exceed base mean {base_mean}"
        );
    }

    #[test]
    fn amplification_scales_the_map() {
        let img = gradient_image(64, 64);
        let low = mean_level(&compute_ela(&img, ELA_QUALITY, 1.0).unwrap());
        let high = mean_level(&compute_ela(&img, ELA_QUALITY, ELA_SCALE).unwrap());
        assert!(high >= low);
    }

    #[test]
    fn mean_level_of_empty_map_is_zero() {
        let empty = RgbImage::new(0, 0);
        assert!(mean_level(&empty).abs() < f32::EPSILON);
    }
}
