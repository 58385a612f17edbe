//! Mirror flips.
//!
//! Flips mirror coordinates only. Landmark indices are left untouched, so a
//! "left eye" point stays at the left-eye index after a horizontal flip even
//! though it now sits on the animal's right side. Callers that need an
//! anatomical left/right swap must permute the keypoint list themselves.

use crate::keypoint::{Keypoint, LabeledImage};
use crate::raster::Raster;
use crate::TransformError;

/// Mirror the image left-right. Keypoints map to `x' = (width - 1) - x`.
pub fn horizontal_flip(input: LabeledImage) -> Result<LabeledImage, TransformError> {
    input.image.validate()?;
    let width = input.image.width;
    let image = flip_raster_horizontal(&input.image);
    let keypoints = input
        .keypoints
        .iter()
        .map(|k| Keypoint::new((width as f64 - 1.0) - k.x, k.y))
        .collect();

    Ok(LabeledImage { image, keypoints })
}

/// Mirror the image top-bottom. Keypoints map to `y' = (height - 1) - y`.
pub fn vertical_flip(input: LabeledImage) -> Result<LabeledImage, TransformError> {
    input.image.validate()?;
    let height = input.image.height;
    let image = flip_raster_vertical(&input.image);
    let keypoints = input
        .keypoints
        .iter()
        .map(|k| Keypoint::new(k.x, (height as f64 - 1.0) - k.y))
        .collect();

    Ok(LabeledImage { image, keypoints })
}

fn flip_raster_horizontal(image: &Raster) -> Raster {
    if image.is_empty() {
        return image.clone();
    }
    let width = image.width as usize;
    let mut pixels = Vec::with_capacity(image.pixels.len());

    // Process each row, copying pixels from right to left
    for row in image.pixels.chunks_exact(width * 3) {
        for px in row.chunks_exact(3).rev() {
            pixels.extend_from_slice(px);
        }
    }

    Raster {
        width: image.width,
        height: image.height,
        pixels,
    }
}

fn flip_raster_vertical(image: &Raster) -> Raster {
    if image.is_empty() {
        return image.clone();
    }
    let row_bytes = image.width as usize * 3;
    let mut pixels = Vec::with_capacity(image.pixels.len());

    for row in image.pixels.chunks_exact(row_bytes).rev() {
        pixels.extend_from_slice(row);
    }

    Raster {
        width: image.width,
        height: image.height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_one() -> Raster {
        Raster::new(2, 1, vec![255, 0, 0, 0, 0, 255])
    }

    #[test]
    fn test_horizontal_flip_pixels_and_points() {
        let input = LabeledImage::new(two_by_one(), vec![Keypoint::new(0.0, 0.0)]);
        let result = horizontal_flip(input).unwrap();

        // Left is now blue, right is red
        assert_eq!(result.image.pixels, vec![0, 0, 255, 255, 0, 0]);
        assert_eq!(result.keypoints[0], Keypoint::new(1.0, 0.0));
    }

    #[test]
    fn test_horizontal_flip_keeps_landmark_order() {
        let points = vec![Keypoint::new(1.0, 3.0), Keypoint::new(8.0, 3.0)];
        let input = LabeledImage::new(Raster::filled(10, 5, [0; 3]), points);
        let result = horizontal_flip(input).unwrap();

        // Index 0 stays index 0 even though it moved to the other side
        assert_eq!(result.keypoints[0], Keypoint::new(8.0, 3.0));
        assert_eq!(result.keypoints[1], Keypoint::new(1.0, 3.0));
    }

    #[test]
    fn test_vertical_flip() {
        let raster = Raster::new(1, 2, vec![1, 1, 1, 2, 2, 2]);
        let input = LabeledImage::new(raster, vec![Keypoint::new(0.0, 0.25)]);
        let result = vertical_flip(input).unwrap();

        assert_eq!(result.image.pixels, vec![2, 2, 2, 1, 1, 1]);
        assert_eq!(result.keypoints[0], Keypoint::new(0.0, 0.75));
    }

    #[test]
    fn test_flip_rejects_corrupted_raster() {
        let input = LabeledImage::new(
            Raster {
                width: 3,
                height: 3,
                pixels: vec![0; 4],
            },
            vec![],
        );
        assert!(horizontal_flip(input).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn noise_image(width: u32, height: u32, seed: u8) -> Raster {
        let pixels = (0..width * height * 3)
            .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
            .collect();
        Raster::new(width, height, pixels)
    }

    proptest! {
        /// Property: Flipping twice is the identity on pixels and keypoints.
        #[test]
        fn prop_double_horizontal_flip_is_identity(
            (w, h) in (1u32..=24, 1u32..=24),
            seed in any::<u8>(),
            points in prop::collection::vec((-10.0f64..40.0, -10.0f64..40.0), 0..18),
        ) {
            let keypoints: Vec<Keypoint> = points.iter().map(|&(x, y)| Keypoint::new(x, y)).collect();
            let input = LabeledImage::new(noise_image(w, h, seed), keypoints);
            let twice = horizontal_flip(horizontal_flip(input.clone()).unwrap()).unwrap();

            prop_assert_eq!(&twice.image, &input.image);
            prop_assert_eq!(twice.keypoints.len(), input.keypoints.len());
            for (a, b) in input.keypoints.iter().zip(&twice.keypoints) {
                prop_assert!((a.x - b.x).abs() < 1e-9);
                prop_assert_eq!(a.y, b.y);
            }
        }

        #[test]
        fn prop_double_vertical_flip_is_identity(
            (w, h) in (1u32..=24, 1u32..=24),
            seed in any::<u8>(),
        ) {
            let input = LabeledImage::new(noise_image(w, h, seed), vec![Keypoint::new(0.5, 2.0)]);
            let twice = vertical_flip(vertical_flip(input.clone()).unwrap()).unwrap();
            prop_assert_eq!(twice, input);
        }
    }
}
