//! Error types for the forgelens crate.

/// Errors that can occur during document analysis.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The declared content type is not one of the supported raster formats.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The uploaded bytes did not decode into a valid pixel grid.
    #[error("corrupt image: {0}")]
    CorruptImage(String),

    /// The upload exceeds the configured size ceiling.
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge {
        /// Size of the rejected upload in bytes.
        size: usize,
        /// Configured ceiling in bytes.
        limit: usize,
    },

    /// The ELA map cannot be shaped into the classifier's input tensor.
    #[error("invalid feature shape: {0}")]
    InvalidFeatureShape(String),

    /// The classifier model failed during inference.
    ///
    /// Load-time failures are not reported through this variant; they are
    /// recovered by substituting the placeholder scorer.
    #[error("classifier model unavailable: {0}")]
    ModelUnavailable(String),

    /// An I/O error occurred while reading uploads or writing records.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image processing (decode, encode, resize).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// An analysis record could not be serialized.
    #[error("record serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("image/tiff".to_string());
        assert!(unsupported.to_string().contains("image/tiff"));

        let too_large = Error::UploadTooLarge {
            size: 20_000_000,
            limit: 10_485_760,
        };
        let msg = too_large.to_string();
        assert!(msg.contains("20000000"));
        assert!(msg.contains("10485760"));
    }
}
