//! Posekit Core - keypoint-aware image transforms
//!
//! This crate provides the image side of pose-estimation data loading:
//! geometric transforms that move 2D keypoints together with the pixels,
//! a composable pipeline with randomized and photometric stages, tensor
//! conversion, and Gaussian heatmap targets.

pub mod error;
pub mod heatmap;
pub mod keypoint;
pub mod pipeline;
pub mod raster;
pub mod tensor;
pub mod transform;

pub use error::TransformError;
pub use heatmap::{get_max_preds, GaussianTarget, TargetGenerator};
pub use keypoint::{BoundingBox, CropWindow, Keypoint, LabeledImage};
pub use pipeline::{Compose, KeypointTransform, TransformState};
pub use raster::{FilterType, Raster};
pub use tensor::{normalize, to_normalized_tensor, to_tensor, IMAGENET_MEAN, IMAGENET_STD};
pub use transform::ResizeTarget;
