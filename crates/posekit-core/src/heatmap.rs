//! Heatmap targets for keypoint regression.
//!
//! A target is one channel per keypoint, shaped `(N, H, W)`, plus a weight
//! per keypoint telling the loss which channels to count.

use ndarray::{s, Array1, Array3, ArrayView2, Axis};

use crate::keypoint::Keypoint;
use crate::TransformError;

/// Renders keypoints into per-channel heatmaps.
pub trait TargetGenerator: Send + Sync {
    /// `keypoints` are in the coordinates of an image of `image_size`
    /// `(width, height)`. The result has shape `(N, heatmap_h, heatmap_w)`.
    fn generate_target(
        &self,
        keypoints: &[Keypoint],
        visibility: &[f32],
        heatmap_size: (u32, u32),
        image_size: (u32, u32),
    ) -> Result<(Array3<f32>, Array1<f32>), TransformError>;
}

/// Unnormalized Gaussian blobs with a peak value of 1.
///
/// The blob covers a `(2r + 1)` square with `r = ceil(3 * sigma)`, centered on
/// the keypoint rounded to the heatmap grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianTarget {
    sigma: f64,
}

impl GaussianTarget {
    pub fn new(sigma: f64) -> Result<Self, TransformError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(TransformError::config(format!(
                "heatmap sigma must be positive, got {}",
                sigma
            )));
        }
        Ok(Self { sigma })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn radius(&self) -> i64 {
        (3.0 * self.sigma).ceil() as i64
    }

    /// The `(2r + 1) x (2r + 1)` kernel, indexed `[y, x]`.
    fn kernel(&self) -> ndarray::Array2<f32> {
        let r = self.radius();
        let size = (2 * r + 1) as usize;
        let denom = 2.0 * self.sigma * self.sigma;
        ndarray::Array2::from_shape_fn((size, size), |(y, x)| {
            let dx = x as f64 - r as f64;
            let dy = y as f64 - r as f64;
            (-(dx * dx + dy * dy) / denom).exp() as f32
        })
    }
}

impl TargetGenerator for GaussianTarget {
    fn generate_target(
        &self,
        keypoints: &[Keypoint],
        visibility: &[f32],
        heatmap_size: (u32, u32),
        image_size: (u32, u32),
    ) -> Result<(Array3<f32>, Array1<f32>), TransformError> {
        if visibility.len() != keypoints.len() {
            return Err(TransformError::KeypointCount {
                expected: keypoints.len(),
                actual: visibility.len(),
            });
        }
        for (width, height) in [heatmap_size, image_size] {
            if width == 0 || height == 0 {
                return Err(TransformError::InvalidDimensions { width, height });
            }
        }

        let (hm_w, hm_h) = (heatmap_size.0 as i64, heatmap_size.1 as i64);
        let stride_x = image_size.0 as f64 / heatmap_size.0 as f64;
        let stride_y = image_size.1 as f64 / heatmap_size.1 as f64;
        let r = self.radius();
        let kernel = self.kernel();

        let mut target = Array3::<f32>::zeros((keypoints.len(), hm_h as usize, hm_w as usize));
        let mut weight = Array1::from(visibility.to_vec());

        for (i, kp) in keypoints.iter().enumerate() {
            if weight[i] <= 0.5 {
                continue;
            }

            let mu_x = (kp.x / stride_x + 0.5).floor();
            let mu_y = (kp.y / stride_y + 0.5).floor();

            // Blob bounds, upper-left inclusive and bottom-right exclusive.
            // Checked in f64 so far-away points never reach the integer cast.
            let rf = r as f64;
            let outside = |mu: f64, size: i64| {
                !mu.is_finite() || mu - rf >= size as f64 || mu + rf + 1.0 <= 0.0
            };
            if outside(mu_x, hm_w) || outside(mu_y, hm_h) {
                weight[i] = 0.0;
                continue;
            }
            let (mu_x, mu_y) = (mu_x as i64, mu_y as i64);
            let ul = (mu_x - r, mu_y - r);
            let br = (mu_x + r + 1, mu_y + r + 1);

            let (img_x0, img_x1) = (ul.0.max(0), br.0.min(hm_w));
            let (img_y0, img_y1) = (ul.1.max(0), br.1.min(hm_h));
            let (g_x0, g_y0) = (img_x0 - ul.0, img_y0 - ul.1);
            let (g_x1, g_y1) = (g_x0 + img_x1 - img_x0, g_y0 + img_y1 - img_y0);

            target
                .slice_mut(s![
                    i,
                    img_y0 as usize..img_y1 as usize,
                    img_x0 as usize..img_x1 as usize
                ])
                .assign(&kernel.slice(s![
                    g_y0 as usize..g_y1 as usize,
                    g_x0 as usize..g_x1 as usize
                ]));
        }

        Ok((target, weight))
    }
}

/// Location and value of the maximum of one heatmap channel.
///
/// Ties resolve to the first position in row-major order.
fn argmax(channel: ArrayView2<'_, f32>) -> (usize, usize, f32) {
    let mut best = (0, 0, f32::NEG_INFINITY);
    for ((y, x), &value) in channel.indexed_iter() {
        if value > best.2 {
            best = (x, y, value);
        }
    }
    best
}

/// Decode heatmaps of shape `(N, H, W)` back to heatmap-grid coordinates.
///
/// Returns one keypoint and one maximum value per channel. Channels whose
/// maximum is not positive decode to `(0, 0)`.
pub fn get_max_preds(heatmaps: &Array3<f32>) -> (Vec<Keypoint>, Vec<f32>) {
    heatmaps
        .axis_iter(Axis(0))
        .map(|channel| {
            let (x, y, value) = argmax(channel);
            if value > 0.0 {
                (Keypoint::new(x as f64, y as f64), value)
            } else {
                (Keypoint::new(0.0, 0.0), value.max(0.0))
            }
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(keypoints: &[Keypoint], visibility: &[f32]) -> (Array3<f32>, Array1<f32>) {
        GaussianTarget::new(2.0)
            .unwrap()
            .generate_target(keypoints, visibility, (64, 64), (256, 256))
            .unwrap()
    }

    #[test]
    fn test_sigma_validation() {
        assert!(GaussianTarget::new(0.0).is_err());
        assert!(GaussianTarget::new(-1.0).is_err());
        assert!(GaussianTarget::new(f64::INFINITY).is_err());
        assert_eq!(GaussianTarget::new(2.0).unwrap().radius(), 6);
    }

    #[test]
    fn test_peak_at_rounded_grid_position() {
        let (target, weight) = render(&[Keypoint::new(100.0, 40.0)], &[1.0]);

        assert_eq!(target.dim(), (1, 64, 64));
        assert_eq!(weight[0], 1.0);
        // 100 / 4 + 0.5 = 25.5 -> 25, 40 / 4 + 0.5 = 10.5 -> 10
        assert_eq!(target[[0, 10, 25]], 1.0);
        let expected = (-1.0f64 / 8.0).exp() as f32;
        assert!((target[[0, 10, 26]] - expected).abs() < 1e-6);
        // Outside the 13x13 blob
        assert_eq!(target[[0, 10, 32]], 0.0);
        assert_eq!(target[[0, 17, 25]], 0.0);
    }

    #[test]
    fn test_invisible_keypoint_renders_nothing() {
        let (target, weight) = render(&[Keypoint::new(100.0, 40.0)], &[0.0]);
        assert_eq!(weight[0], 0.0);
        assert!(target.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_far_outside_keypoint_gets_zero_weight() {
        let keypoints = [Keypoint::new(-200.0, 10.0), Keypoint::new(10.0, 2000.0)];
        let (target, weight) = render(&keypoints, &[1.0, 1.0]);
        assert_eq!(weight.to_vec(), vec![0.0, 0.0]);
        assert!(target.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_huge_finite_keypoint_gets_zero_weight() {
        let keypoints = [
            Keypoint::new(1e300, 10.0),
            Keypoint::new(10.0, -1e300),
            Keypoint::new(f64::MAX, f64::MIN),
        ];
        let (target, weight) = render(&keypoints, &[1.0, 1.0, 1.0]);
        assert_eq!(weight.to_vec(), vec![0.0, 0.0, 0.0]);
        assert!(target.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_blob_touching_edge_keeps_weight() {
        // mu_x = 64 + 6 - 1: the blob's left column is the last heatmap column
        let (target, weight) = render(&[Keypoint::new(276.0, 40.0)], &[1.0]);
        assert_eq!(weight[0], 1.0);
        assert!(target[[0, 10, 63]] > 0.0);

        // One cell further and the blob leaves the heatmap
        let (_, weight) = render(&[Keypoint::new(280.0, 40.0)], &[1.0]);
        assert_eq!(weight[0], 0.0);
    }

    #[test]
    fn test_partially_outside_blob_is_clipped() {
        // Center one grid cell left of the heatmap: the right half is still visible
        let (target, weight) = render(&[Keypoint::new(-4.0, 40.0)], &[1.0]);
        assert_eq!(weight[0], 1.0);
        let expected = (-1.0f64 / 8.0).exp() as f32;
        assert!((target[[0, 10, 0]] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_visibility_length_mismatch() {
        let result = GaussianTarget::new(2.0).unwrap().generate_target(
            &[Keypoint::new(1.0, 1.0)],
            &[],
            (8, 8),
            (8, 8),
        );
        assert!(matches!(result, Err(TransformError::KeypointCount { .. })));
    }

    #[test]
    fn test_zero_heatmap_size_rejected() {
        let result = GaussianTarget::new(2.0).unwrap().generate_target(
            &[],
            &[],
            (0, 8),
            (8, 8),
        );
        assert!(matches!(
            result,
            Err(TransformError::InvalidDimensions { width: 0, height: 8 })
        ));
    }

    #[test]
    fn test_get_max_preds_recovers_peaks() {
        let keypoints = [Keypoint::new(100.0, 40.0), Keypoint::new(8.0, 252.0)];
        let (target, _) = render(&keypoints, &[1.0, 1.0]);
        let (preds, maxvals) = get_max_preds(&target);

        assert_eq!(preds[0], Keypoint::new(25.0, 10.0));
        assert_eq!(preds[1], Keypoint::new(2.0, 63.0));
        assert_eq!(maxvals, vec![1.0, 1.0]);
    }

    #[test]
    fn test_get_max_preds_zeroes_empty_channels() {
        let mut heatmaps = Array3::<f32>::from_elem((2, 4, 4), -1.0);
        heatmaps[[1, 2, 3]] = 0.5;
        let (preds, maxvals) = get_max_preds(&heatmaps);

        assert_eq!(preds[0], Keypoint::new(0.0, 0.0));
        assert_eq!(maxvals[0], 0.0);
        assert_eq!(preds[1], Keypoint::new(3.0, 2.0));
        assert_eq!(maxvals[1], 0.5);
    }
}
