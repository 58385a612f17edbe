//! Error type shared by the transform primitives and the pipeline.

use thiserror::Error;

/// Errors raised while building or applying keypoint-aware transforms.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A transform was constructed with invalid arguments.
    #[error("Invalid transform configuration: {0}")]
    InvalidConfig(String),

    /// The keypoint list does not have the expected number of points.
    #[error("Expected {expected} keypoints, got {actual}")]
    KeypointCount { expected: usize, actual: usize },

    /// A requested output size has a zero dimension.
    #[error("Invalid output dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The pixel buffer does not match the declared dimensions.
    #[error("Corrupted raster: {0}")]
    CorruptedImage(String),

    /// The image codec failed to decode a file or buffer.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

impl TransformError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        TransformError::InvalidConfig(message.into())
    }
}
