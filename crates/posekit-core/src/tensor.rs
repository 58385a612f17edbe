//! Conversion from rasters to channel-first float tensors.

use ndarray::{Array3, Axis};

use crate::raster::Raster;
use crate::TransformError;

/// ImageNet channel means, the usual normalization for pretrained backbones.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet channel standard deviations.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Convert to a `(3, H, W)` tensor with values in `[0, 1]`.
pub fn to_tensor(image: &Raster) -> Result<Array3<f32>, TransformError> {
    image.validate()?;
    let (w, h) = (image.width as usize, image.height as usize);

    // The buffer is (H, W, C); permute to (C, H, W)
    let hwc = Array3::from_shape_vec((h, w, 3), image.pixels.clone())
        .map_err(|e| TransformError::CorruptedImage(e.to_string()))?;
    let chw = hwc.permuted_axes([2, 0, 1]).mapv(|v| v as f32 / 255.0);
    Ok(chw.as_standard_layout().into_owned())
}

/// Normalize each channel in place: `(v - mean[c]) / std[c]`.
pub fn normalize(
    tensor: &mut Array3<f32>,
    mean: [f32; 3],
    std: [f32; 3],
) -> Result<(), TransformError> {
    if tensor.len_of(Axis(0)) != 3 {
        return Err(TransformError::config(format!(
            "expected 3 channels, got {}",
            tensor.len_of(Axis(0))
        )));
    }
    if std.iter().any(|&s| !s.is_finite() || s <= 0.0) {
        return Err(TransformError::config(format!(
            "standard deviations must be positive, got {:?}",
            std
        )));
    }

    for (c, mut channel) in tensor.axis_iter_mut(Axis(0)).enumerate() {
        let (m, s) = (mean[c], std[c]);
        channel.mapv_inplace(|v| (v - m) / s);
    }
    Ok(())
}

/// [`to_tensor`] followed by [`normalize`].
pub fn to_normalized_tensor(
    image: &Raster,
    mean: [f32; 3],
    std: [f32; 3],
) -> Result<Array3<f32>, TransformError> {
    let mut tensor = to_tensor(image)?;
    normalize(&mut tensor, mean, std)?;
    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_first_layout() {
        // 2x1 image: red then blue
        let image = Raster::new(2, 1, vec![255, 0, 0, 0, 0, 255]);
        let t = to_tensor(&image).unwrap();

        assert_eq!(t.dim(), (3, 1, 2));
        assert_eq!(t[[0, 0, 0]], 1.0);
        assert_eq!(t[[2, 0, 0]], 0.0);
        assert_eq!(t[[0, 0, 1]], 0.0);
        assert_eq!(t[[2, 0, 1]], 1.0);
        assert!(t.is_standard_layout());
    }

    #[test]
    fn test_rows_map_to_height() {
        let mut image = Raster::filled(3, 2, [0; 3]);
        image.set_pixel(2, 1, [0, 51, 0]);
        let t = to_tensor(&image).unwrap();
        assert!((t[[1, 1, 2]] - 0.2).abs() < 1e-6);
        assert_eq!(t[[1, 0, 2]], 0.0);
    }

    #[test]
    fn test_normalize_per_channel() {
        let image = Raster::filled(2, 2, [255, 0, 255]);
        let t = to_normalized_tensor(&image, [0.5, 0.5, 0.0], [0.5, 0.25, 2.0]).unwrap();
        assert!(t.index_axis(Axis(0), 0).iter().all(|&v| (v - 1.0).abs() < 1e-6));
        assert!(t.index_axis(Axis(0), 1).iter().all(|&v| (v + 2.0).abs() < 1e-6));
        assert!(t.index_axis(Axis(0), 2).iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_normalize_rejects_zero_std() {
        let mut t = Array3::<f32>::zeros((3, 1, 1));
        assert!(normalize(&mut t, IMAGENET_MEAN, [0.2, 0.0, 0.2]).is_err());
    }

    #[test]
    fn test_corrupted_raster_rejected() {
        let image = Raster {
            width: 4,
            height: 4,
            pixels: vec![0; 5],
        };
        assert!(to_tensor(&image).is_err());
    }
}
