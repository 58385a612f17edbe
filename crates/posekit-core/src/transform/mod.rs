//! Keypoint-aware geometric primitives.
//!
//! Every primitive takes a [`LabeledImage`](crate::keypoint::LabeledImage) by
//! value and returns a new one whose keypoints went through exactly the same
//! coordinate mapping as the pixels. Primitives never add, drop or reorder
//! keypoints.
//!
//! # Coordinate System
//!
//! - Origin is the top-left pixel; pixel `(i, j)` has its center at `(i, j)`
//! - Rotation angles are in degrees, positive = counter-clockwise on screen
//! - Crop windows are integer pixels and may extend past the image

mod crop;
mod flip;
mod resize;
mod rotation;

pub use crop::{center_crop, crop, crop_raster, resized_crop};
pub use flip::{horizontal_flip, vertical_flip};
pub use resize::{resize, resize_pad, ResizeTarget};
pub use rotation::{rotate, rotate_point, rotation_center};
