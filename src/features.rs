//! Feature normalization: ELA map to classifier input tensor.

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{Array3, Array4};

use crate::error::{Error, Result};

/// Side length of the classifier's square input (128x128x3).
pub const CLASSIFIER_INPUT_SIZE: u32 = 128;

/// Interpolation used when resizing the ELA map.
///
/// Triangle (bilinear) is deterministic and cheap; the classifier was
/// trained on bilinearly-resized maps.
const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// A fixed-shape `(128, 128, 3)` tensor of channel values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTensor {
    data: Array3<f32>,
}

impl FeatureTensor {
    /// Wrap a raw array, checking the expected shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFeatureShape`] if the array is not
    /// `(128, 128, 3)`.
    pub fn from_array(data: Array3<f32>) -> Result<Self> {
        let size = CLASSIFIER_INPUT_SIZE as usize;
        if data.shape() != [size, size, 3] {
            return Err(Error::InvalidFeatureShape(format!(
                "expected ({size}, {size}, 3), got {:?}",
                data.shape()
            )));
        }
        Ok(Self { data })
    }

    /// The underlying `(H, W, C)` array.
    #[must_use]
    pub fn as_array(&self) -> &Array3<f32> {
        &self.data
    }

    /// Mean of all channel values.
    #[must_use]
    pub fn mean(&self) -> f32 {
        self.data.mean().unwrap_or(0.0)
    }

    /// Consume the tensor into a `(1, H, W, C)` batch for the ONNX session.
    ///
    /// # Panics
    ///
    /// Never in practice: the reshape only adds a unit axis to a tensor
    /// whose shape was already validated.
    #[must_use]
    pub fn into_batched(self) -> Array4<f32> {
        let size = CLASSIFIER_INPUT_SIZE as usize;
        self.data
            .into_shape_with_order((1, size, size, 3))
            .expect("(H, W, C) reshapes to (1, H, W, C)")
    }
}

/// Resize and rescale an ELA map into the classifier's input tensor.
///
/// Resizes to 128x128 with bilinear interpolation, then maps each u8 channel
/// value into `[0, 1]`.
///
/// # Errors
///
/// Returns [`Error::InvalidFeatureShape`] if the map has zero area.
pub fn normalize(ela: &RgbImage) -> Result<FeatureTensor> {
    let (width, height) = ela.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::InvalidFeatureShape(format!(
            "degenerate {width}x{height} image"
        )));
    }

    let resized = imageops::resize(
        ela,
        CLASSIFIER_INPUT_SIZE,
        CLASSIFIER_INPUT_SIZE,
        RESIZE_FILTER,
    );

    let size = CLASSIFIER_INPUT_SIZE as usize;
    let data = Array3::from_shape_fn((size, size, 3), |(y, x, c)| {
        #[allow(clippy::cast_possible_truncation)]
        let px = resized.get_pixel(x as u32, y as u32);
        f32::from(px[c]) / 255.0
    });

    FeatureTensor::from_array(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::gradient_image;

    #[test]
    fn normalize_produces_fixed_shape() {
        let tensor = normalize(&gradient_image(640, 480)).unwrap();
        assert_eq!(tensor.as_array().shape(), [128, 128, 3]);
    }

    #[test]
    fn normalize_handles_images_smaller_than_target() {
        let tensor = normalize(&gradient_image(16, 16)).unwrap();
        assert_eq!(tensor.as_array().shape(), [128, 128, 3]);
    }

    #[test]
    fn normalized_values_lie_in_unit_range() {
        let tensor = normalize(&gradient_image(200, 100)).unwrap();
        for &v in tensor.as_array() {
            assert!((0.0..=1.0).contains(&v), "value {v} out of range");
        }
    }

    #[test]
    fn normalize_rejects_zero_area_image() {
        let err = normalize(&RgbImage::new(0, 0)).unwrap_err();
        assert!(matches!(err, Error::InvalidFeatureShape(_)));
    }

    #[test]
    fn normalize_is_deterministic() {
        let img = gradient_image(300, 200);
        assert_eq!(normalize(&img).unwrap(), normalize(&img).unwrap());
    }

    #[test]
    fn from_array_rejects_wrong_shape() {
        let err = FeatureTensor::from_array(Array3::zeros((64, 64, 3))).unwrap_err();
        assert!(matches!(err, Error::InvalidFeatureShape(_)));
    }

    #[test]
    fn batched_tensor_has_leading_unit_dimension() {
        let tensor = normalize(&gradient_image(128, 128)).unwrap();
        let batched = tensor.into_batched();
        assert_eq!(batched.shape(), [1, 128, 128, 3]);
    }

    #[test]
    fn white_image_normalizes_to_ones() {
        let img = RgbImage::from_pixel(50, 50, image::Rgb([255, 255, 255]));
        let tensor = normalize(&img).unwrap();
        assert!((tensor.mean() - 1.0).abs() < 1e-4);
    }
}
