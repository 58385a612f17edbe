//! Raster resampling.
//!
//! These functions only touch pixels. The keypoint-aware wrappers in
//! `crate::transform` compute coordinate factors from the dimensions
//! returned here.

use super::{FilterType, Raster};
use crate::TransformError;

/// Resize a raster to exact dimensions.
///
/// # Errors
///
/// Returns `TransformError::InvalidDimensions` for a zero target dimension and
/// `TransformError::CorruptedImage` if the source buffer is malformed.
pub fn resize_raster(
    image: &Raster,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Raster, TransformError> {
    if width == 0 || height == 0 {
        return Err(TransformError::InvalidDimensions { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image.to_rgb_image()?;
    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(Raster::from_rgb_image(resized))
}

/// Dimensions after matching the shorter edge to `size`.
///
/// The longer edge is `floor(size * long / short)`, so the aspect ratio is
/// kept up to truncation.
pub fn shorter_side_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let (short, long) = if width <= height {
        (width, height)
    } else {
        (height, width)
    };
    let new_long = ((size as u64 * long as u64) / short as u64) as u32;

    if width <= height {
        (size, new_long.max(1))
    } else {
        (new_long.max(1), size)
    }
}

/// Dimensions after matching the longer edge to `size`.
///
/// The shorter edge is rounded to the nearest pixel and never drops below 1.
pub fn longer_side_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        // Landscape or square: constrain by width
        let new_height = (size as f64 / ratio).round() as u32;
        (size, new_height.max(1))
    } else {
        // Portrait: constrain by height
        let new_width = (size as f64 * ratio).round() as u32;
        (new_width.max(1), size)
    }
}
