//! Pixel-window cropping.
//!
//! Crop windows are given in integer pixels relative to the source image.
//! The window is never clamped: any part of it that falls outside the
//! source is filled with zeros, and keypoints are translated by
//! `(-left, -top)` even when that leaves them outside the output. Whether a
//! point is still visible is tracked by the caller, not here.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left pixel
//! - `left`/`top` may be negative

use super::resize::{resize, ResizeTarget};
use crate::keypoint::{CropWindow, Keypoint, LabeledImage};
use crate::raster::{FilterType, Raster};
use crate::TransformError;

/// Extract the pixels covered by `window`.
///
/// Pixels of the window outside the source image are black.
pub fn crop_raster(image: &Raster, window: CropWindow) -> Raster {
    // Fast path: full crop returns a clone
    if window == CropWindow::full(image.width, image.height) {
        return image.clone();
    }

    let out_width = window.width;
    let out_height = window.height;
    let mut output = vec![0u8; (out_width as usize) * (out_height as usize) * 3];

    // Horizontal overlap between the window and the source, in source columns
    let src_w = image.width as i64;
    let src_h = image.height as i64;
    let x0 = window.left.max(0);
    let x1 = window.left.saturating_add(out_width as i64).min(src_w);

    if x0 < x1 {
        let row_bytes = ((x1 - x0) * 3) as usize;
        let dst_x = (x0 - window.left) as usize;

        // Copy pixel data row by row for efficiency
        for y in 0..out_height as i64 {
            let src_y = window.top.saturating_add(y);
            if src_y < 0 || src_y >= src_h {
                continue;
            }
            let src_start = ((src_y * src_w + x0) * 3) as usize;
            let dst_start = ((y as usize) * out_width as usize + dst_x) * 3;
            output[dst_start..dst_start + row_bytes]
                .copy_from_slice(&image.pixels[src_start..src_start + row_bytes]);
        }
    }

    Raster {
        width: out_width,
        height: out_height,
        pixels: output,
    }
}

/// Crop an image and translate its keypoints into the window's frame.
///
/// # Arguments
///
/// * `input` - Image and keypoints
/// * `top` - Top edge of the window in source pixels
/// * `left` - Left edge of the window in source pixels
/// * `height` - Window height
/// * `width` - Window width
///
/// # Errors
///
/// Returns `TransformError::InvalidDimensions` for an empty window and
/// `TransformError::CorruptedImage` for a malformed source buffer.
pub fn crop(
    input: LabeledImage,
    top: i64,
    left: i64,
    height: u32,
    width: u32,
) -> Result<LabeledImage, TransformError> {
    if width == 0 || height == 0 {
        return Err(TransformError::InvalidDimensions { width, height });
    }
    input.image.validate()?;

    let image = crop_raster(&input.image, CropWindow::new(left, top, width, height));
    let keypoints = input
        .keypoints
        .iter()
        .map(|k| Keypoint::new(k.x - left as f64, k.y - top as f64))
        .collect();

    Ok(LabeledImage { image, keypoints })
}

/// Crop, then resize the window to `target`. Exactly `crop` followed by `resize`.
pub fn resized_crop(
    input: LabeledImage,
    top: i64,
    left: i64,
    height: u32,
    width: u32,
    target: ResizeTarget,
    filter: FilterType,
) -> Result<LabeledImage, TransformError> {
    let cropped = crop(input, top, left, height, width)?;
    resize(cropped, target, filter)
}

/// Crop the central `width x height` region.
///
/// Offsets are `(dim - target_dim) / 2` rounded half-to-even, so a 5-pixel
/// image cropped to 2 starts at row 2 while a 7-pixel image cropped to 2
/// starts at column 2.
pub fn center_crop(
    input: LabeledImage,
    width: u32,
    height: u32,
) -> Result<LabeledImage, TransformError> {
    let top = center_offset(input.image.height, height);
    let left = center_offset(input.image.width, width);
    crop(input, top, left, height, width)
}

fn center_offset(dim: u32, target: u32) -> i64 {
    ((dim as f64 - target as f64) / 2.0).round_ties_even() as i64
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions (keep reasonable for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=40, 1u32..=40)
    }

    /// Strategy for generating crop windows that may leave the image.
    fn window_strategy() -> impl Strategy<Value = (i64, i64, u32, u32)> {
        (-20i64..=40, -20i64..=40, 1u32..=40, 1u32..=40)
    }

    fn create_test_image(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 251 + 1) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        Raster::new(width, height, pixels)
    }

    proptest! {
        /// Property: Output size always equals the requested window.
        #[test]
        fn prop_output_matches_window(
            (width, height) in dimensions_strategy(),
            (left, top, crop_w, crop_h) in window_strategy(),
        ) {
            let input = LabeledImage::new(create_test_image(width, height), vec![]);
            let result = crop(input, top, left, crop_h, crop_w).unwrap();

            prop_assert_eq!(result.image.dimensions(), (crop_w, crop_h));
            prop_assert_eq!(result.image.pixels.len(), (crop_w * crop_h * 3) as usize);
        }

        /// Property: Adding the offset back reconstructs the original keypoints exactly.
        #[test]
        fn prop_crop_translation_is_exact(
            (left, top, crop_w, crop_h) in window_strategy(),
            points in prop::collection::vec((-50i32..50, -50i32..50), 0..18),
        ) {
            let keypoints: Vec<Keypoint> = points
                .iter()
                .map(|&(x, y)| Keypoint::new(x as f64, y as f64))
                .collect();
            let input = LabeledImage::new(create_test_image(8, 8), keypoints.clone());
            let result = crop(input, top, left, crop_h, crop_w).unwrap();

            prop_assert_eq!(result.keypoints.len(), keypoints.len());
            for (orig, moved) in keypoints.iter().zip(&result.keypoints) {
                prop_assert_eq!(moved.x + left as f64, orig.x);
                prop_assert_eq!(moved.y + top as f64, orig.y);
            }
        }

        /// Property: Every output pixel is either the source pixel or zero fill.
        #[test]
        fn prop_cropped_pixels_from_original(
            (width, height) in dimensions_strategy(),
            (left, top, crop_w, crop_h) in window_strategy(),
        ) {
            let img = create_test_image(width, height);
            let result = crop_raster(&img, CropWindow::new(left, top, crop_w, crop_h));

            for y in 0..crop_h {
                for x in 0..crop_w {
                    let sx = left + x as i64;
                    let sy = top + y as i64;
                    let expected = if sx >= 0 && sy >= 0 && sx < width as i64 && sy < height as i64 {
                        img.pixel(sx as u32, sy as u32)
                    } else {
                        [0, 0, 0]
                    };
                    prop_assert_eq!(result.pixel(x, y), expected);
                }
            }
        }
    }
}
