//! Rotation about the image center, applied to pixels and keypoints alike.
//!
//! # Algorithm
//!
//! The output canvas keeps the input size. The rotation center is
//! `c = ((W - 1) / 2, (H - 1) / 2)` in pixel-index coordinates, and a positive
//! angle turns content counter-clockwise on screen (y axis pointing down).
//!
//! Keypoints are mapped forward with θ = -angle:
//! ```text
//! x' = cos θ * (x - cx) - sin θ * (y - cy) + cx
//! y' = sin θ * (x - cx) + cos θ * (y - cy) + cy
//! ```
//!
//! Pixels use inverse mapping with the same matrix: for each output pixel we
//! rotate by -θ to find the source location and interpolate there. Both paths
//! share one matrix, so a keypoint placed on a pixel follows that pixel.

use crate::keypoint::{Keypoint, LabeledImage};
use crate::raster::{FilterType, Raster};
use crate::TransformError;

/// Rotate an image and its keypoints by `angle_degrees` about the center.
///
/// Output pixels whose source falls outside the input are set to `fill`.
pub fn rotate(
    input: LabeledImage,
    angle_degrees: f64,
    filter: FilterType,
    fill: [u8; 3],
) -> Result<LabeledImage, TransformError> {
    input.image.validate()?;

    // Fast path: no rotation needed
    if angle_degrees.abs() < 1e-9 {
        return Ok(input);
    }

    let center = rotation_center(input.image.width, input.image.height);
    let image = rotate_raster(&input.image, angle_degrees, filter, fill);
    let keypoints = input
        .keypoints
        .iter()
        .map(|k| rotate_point(*k, center, angle_degrees))
        .collect();

    Ok(LabeledImage { image, keypoints })
}

/// Center of rotation for a `width x height` raster.
#[inline]
pub fn rotation_center(width: u32, height: u32) -> (f64, f64) {
    ((width as f64 - 1.0) / 2.0, (height as f64 - 1.0) / 2.0)
}

/// Rotate a single point about `center`.
pub fn rotate_point(point: Keypoint, center: (f64, f64), angle_degrees: f64) -> Keypoint {
    let theta = -angle_degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let dx = point.x - center.0;
    let dy = point.y - center.1;

    Keypoint::new(cos * dx - sin * dy + center.0, sin * dx + cos * dy + center.1)
}

fn rotate_raster(
    image: &Raster,
    angle_degrees: f64,
    filter: FilterType,
    fill: [u8; 3],
) -> Raster {
    let (cx, cy) = rotation_center(image.width, image.height);

    // Inverse of the keypoint matrix: rotate by +angle
    let theta = angle_degrees.to_radians();
    let (sin, cos) = theta.sin_cos();

    let mut output = Raster::filled(image.width, image.height, fill);

    for dst_y in 0..image.height {
        for dst_x in 0..image.width {
            let dx = dst_x as f64 - cx;
            let dy = dst_y as f64 - cy;

            let src_x = cos * dx - sin * dy + cx;
            let src_y = sin * dx + cos * dy + cy;

            let pixel = match filter {
                FilterType::Nearest => sample_nearest(image, src_x, src_y),
                FilterType::Bilinear => sample_bilinear(image, src_x, src_y),
                FilterType::Lanczos3 => sample_lanczos3(image, src_x, src_y),
            };

            if let Some(pixel) = pixel {
                output.set_pixel(dst_x, dst_y, pixel);
            }
        }
    }

    output
}

/// Get a pixel as [f64; 3] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &Raster, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

fn sample_nearest(image: &Raster, x: f64, y: f64) -> Option<[u8; 3]> {
    let px = x.round();
    let py = y.round();
    if px < 0.0 || py < 0.0 || px >= image.width as f64 || py >= image.height as f64 {
        return None;
    }
    Some(image.pixel(px as u32, py as u32))
}

/// Sample a pixel using bilinear interpolation.
///
/// Bilinear interpolation considers the 4 nearest pixels and weights
/// their contribution based on distance. Neighbors outside the image are
/// clamped to the border; locations more than half a pixel outside return None.
fn sample_bilinear(image: &Raster, x: f64, y: f64) -> Option<[u8; 3]> {
    let (w, h) = (image.width as f64, image.height as f64);

    if x < -0.5 || x > w - 0.5 || y < -0.5 || y > h - 0.5 {
        return None;
    }

    let x = x.clamp(0.0, w - 1.0);
    let y = y.clamp(0.0, h - 1.0);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    Some(result)
}

/// Sample a pixel using Lanczos3 interpolation.
///
/// Lanczos3 considers a 6x6 neighborhood of pixels, providing
/// higher quality results especially for sharp edges.
fn sample_lanczos3(image: &Raster, x: f64, y: f64) -> Option<[u8; 3]> {
    let (w, h) = (image.width as i64, image.height as i64);

    // Fall back to bilinear near edges where the kernel would leave the image
    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            let dx = x - px as f64;
            let dy = y - py as f64;
            let weight = lanczos_weight(dx, 3.0) * lanczos_weight(dy, 3.0);

            let pixel = get_pixel_f64(image, px as usize, py as usize);
            sum[0] += pixel[0] * weight;
            sum[1] += pixel[1] * weight;
            sum[2] += pixel[2] * weight;
            weight_sum += weight;
        }
    }

    let mut result = [0u8; 3];
    if weight_sum > 0.0 {
        for i in 0..3 {
            result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
        }
    }

    Some(result)
}

/// Lanczos kernel weight: `sinc(x) * sinc(x / a)` for `|x| < a`, else 0.
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A black image with a single bright pixel.
    fn single_pixel_image(width: u32, height: u32, x: u32, y: u32) -> Raster {
        let mut img = Raster::filled(width, height, [0, 0, 0]);
        img.set_pixel(x, y, [255, 255, 255]);
        img
    }

    fn bright_pixels(img: &Raster) -> Vec<(u32, u32)> {
        let mut found = Vec::new();
        for y in 0..img.height {
            for x in 0..img.width {
                if img.pixel(x, y)[0] > 128 {
                    found.push((x, y));
                }
            }
        }
        found
    }

    #[test]
    fn test_no_rotation() {
        let input = LabeledImage::new(
            single_pixel_image(7, 5, 1, 1),
            vec![Keypoint::new(1.0, 1.0)],
        );
        let result = rotate(input.clone(), 0.0, FilterType::Bilinear, [0; 3]).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_rotation_keeps_canvas_size() {
        let input = LabeledImage::new(Raster::filled(40, 20, [50; 3]), vec![]);
        let result = rotate(input, 30.0, FilterType::Bilinear, [0; 3]).unwrap();
        assert_eq!(result.image.dimensions(), (40, 20));
    }

    #[test]
    fn test_positive_angle_is_counter_clockwise() {
        // Pixel right of center moves above center
        let input = LabeledImage::new(
            single_pixel_image(5, 5, 3, 2),
            vec![Keypoint::new(3.0, 2.0)],
        );
        let result = rotate(input, 90.0, FilterType::Nearest, [0; 3]).unwrap();

        let k = result.keypoints[0];
        assert!((k.x - 2.0).abs() < 1e-9);
        assert!((k.y - 1.0).abs() < 1e-9);
        assert_eq!(bright_pixels(&result.image), vec![(2, 1)]);
    }

    #[test]
    fn test_keypoints_follow_pixels_at_180() {
        let input = LabeledImage::new(
            single_pixel_image(6, 4, 1, 0),
            vec![Keypoint::new(1.0, 0.0)],
        );
        let result = rotate(input, 180.0, FilterType::Bilinear, [0; 3]).unwrap();

        let k = result.keypoints[0];
        assert!((k.x - 4.0).abs() < 1e-9);
        assert!((k.y - 3.0).abs() < 1e-9);
        assert_eq!(bright_pixels(&result.image), vec![(4, 3)]);
    }

    #[test]
    fn test_center_is_fixed_point() {
        let center = rotation_center(9, 7);
        for angle in [13.0, 90.0, -45.0, 271.0] {
            let k = rotate_point(Keypoint::new(center.0, center.1), center, angle);
            assert!((k.x - center.0).abs() < 1e-9);
            assert!((k.y - center.1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rotation_round_trip_keypoints() {
        let center = rotation_center(64, 48);
        let k = Keypoint::new(10.5, 40.25);
        let there = rotate_point(k, center, 37.0);
        let back = rotate_point(there, center, -37.0);
        assert!((back.x - k.x).abs() < 1e-9);
        assert!((back.y - k.y).abs() < 1e-9);
    }

    #[test]
    fn test_uncovered_corners_use_fill() {
        let input = LabeledImage::new(Raster::filled(20, 20, [200; 3]), vec![]);
        let result = rotate(input, 45.0, FilterType::Bilinear, [9, 9, 9]).unwrap();

        assert_eq!(result.image.pixel(0, 0), [9, 9, 9]);
        assert_eq!(result.image.pixel(10, 10), [200, 200, 200]);
    }

    #[test]
    fn test_lanczos_small_image_fallback() {
        let input = LabeledImage::new(Raster::filled(8, 8, [100; 3]), vec![]);
        let result = rotate(input, 15.0, FilterType::Lanczos3, [0; 3]).unwrap();
        assert_eq!(result.image.dimensions(), (8, 8));
        assert_eq!(result.image.pixel(4, 4), [100, 100, 100]);
    }
}
