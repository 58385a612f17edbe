//! Keypoint-aware resizing and letterbox padding.

use serde::{Deserialize, Serialize};

use crate::keypoint::{Keypoint, LabeledImage};
use crate::raster::{
    longer_side_dimensions, resize_raster, shorter_side_dimensions, FilterType, Raster,
};
use crate::TransformError;

/// Output size of a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeTarget {
    /// Exact (width, height).
    Exact(u32, u32),
    /// Match the shorter edge to this length, keeping the aspect ratio.
    ShorterSide(u32),
}

impl ResizeTarget {
    /// Output dimensions for a `width x height` input.
    pub fn dimensions(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            ResizeTarget::Exact(w, h) => (w, h),
            ResizeTarget::ShorterSide(size) => shorter_side_dimensions(width, height, size),
        }
    }
}

/// Scale every keypoint by `(sx, sy)`.
fn scale_keypoints(keypoints: &[Keypoint], sx: f64, sy: f64) -> Vec<Keypoint> {
    keypoints
        .iter()
        .map(|k| Keypoint::new(k.x * sx, k.y * sy))
        .collect()
}

/// Resize an image and scale its keypoints by the same per-axis factor.
///
/// The factor is `output_dim / input_dim`, computed from the dimensions of
/// the raster actually produced, so keypoints follow the pixels even when
/// `ShorterSide` truncates the longer edge.
///
/// # Errors
///
/// Returns `TransformError::InvalidDimensions` for a zero-sized input or target.
pub fn resize(
    input: LabeledImage,
    target: ResizeTarget,
    filter: FilterType,
) -> Result<LabeledImage, TransformError> {
    let (src_w, src_h) = input.image.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(TransformError::InvalidDimensions {
            width: src_w,
            height: src_h,
        });
    }

    let (dst_w, dst_h) = target.dimensions(src_w, src_h);
    let image = resize_raster(&input.image, dst_w, dst_h, filter)?;

    let sx = image.width as f64 / src_w as f64;
    let sy = image.height as f64 / src_h as f64;
    let keypoints = scale_keypoints(&input.keypoints, sx, sy);

    Ok(LabeledImage { image, keypoints })
}

/// Aspect-preserving resize to a `size x size` square with constant padding.
///
/// The longer side becomes `size`. The deficit on the shorter axis is split
/// `floor` before and `ceil` after, so only one axis is ever padded. Keypoints
/// are scaled by the resize factor and shifted by the leading pad.
///
/// # Example
///
/// A 100x50 image padded to 200 is resized to 200x100, then padded by 50 rows
/// on top and 50 rows below; a keypoint at (0, 0) lands at (0, 50).
pub fn resize_pad(
    input: LabeledImage,
    size: u32,
    filter: FilterType,
    fill: [u8; 3],
) -> Result<LabeledImage, TransformError> {
    if size == 0 {
        return Err(TransformError::InvalidDimensions {
            width: size,
            height: size,
        });
    }

    let (src_w, src_h) = input.image.dimensions();
    let (new_w, new_h) = longer_side_dimensions(src_w, src_h, size);
    let resized = resize(input, ResizeTarget::Exact(new_w, new_h), filter)?;

    let pad_left = (size - new_w) / 2;
    let pad_top = (size - new_h) / 2;

    let image = paste_on_canvas(&resized.image, size, size, pad_left, pad_top, fill);
    let keypoints = resized
        .keypoints
        .iter()
        .map(|k| Keypoint::new(k.x + pad_left as f64, k.y + pad_top as f64))
        .collect();

    Ok(LabeledImage { image, keypoints })
}

/// Copy `image` onto a `width x height` canvas filled with `fill` at (left, top).
fn paste_on_canvas(
    image: &Raster,
    width: u32,
    height: u32,
    left: u32,
    top: u32,
    fill: [u8; 3],
) -> Raster {
    let mut canvas = Raster::filled(width, height, fill);
    let row_bytes = (image.width * 3) as usize;

    for y in 0..image.height {
        let src_start = (y * image.width * 3) as usize;
        let dst_start = (((top + y) * width + left) * 3) as usize;
        canvas.pixels[dst_start..dst_start + row_bytes]
            .copy_from_slice(&image.pixels[src_start..src_start + row_bytes]);
    }

    canvas
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Resize keeps the number of keypoints and hits the requested size.
        #[test]
        fn prop_resize_preserves_count(
            (w, h) in (1u32..=32, 1u32..=32),
            (tw, th) in (1u32..=48, 1u32..=48),
            points in prop::collection::vec((0.0f64..32.0, 0.0f64..32.0), 0..18),
        ) {
            let keypoints: Vec<Keypoint> = points.iter().map(|&(x, y)| Keypoint::new(x, y)).collect();
            let input = LabeledImage::new(Raster::filled(w, h, [1, 2, 3]), keypoints.clone());
            let result = resize(input, ResizeTarget::Exact(tw, th), FilterType::Nearest).unwrap();

            prop_assert_eq!(result.image.dimensions(), (tw, th));
            prop_assert_eq!(result.keypoints.len(), keypoints.len());
        }

        /// Property: resize_pad always yields a square of the requested size.
        #[test]
        fn prop_resize_pad_is_square(
            (w, h) in (1u32..=40, 1u32..=40),
            size in 1u32..=64,
        ) {
            let input = LabeledImage::new(Raster::filled(w, h, [1, 2, 3]), vec![Keypoint::default()]);
            let result = resize_pad(input, size, FilterType::Nearest, [0, 0, 0]).unwrap();

            prop_assert_eq!(result.image.dimensions(), (size, size));
            prop_assert_eq!(result.keypoints.len(), 1);
            // Only one axis carries an offset
            let k = result.keypoints[0];
            prop_assert!(k.x == 0.0 || k.y == 0.0);
        }
    }
}
