//! Image-only transforms and the adapter that lifts them into a pipeline.

use rand::{Rng, RngCore};

use super::{KeypointTransform, TransformState};
use crate::keypoint::LabeledImage;
use crate::raster::Raster;
use crate::TransformError;

/// A transform that changes pixel values but never geometry.
pub trait PhotometricTransform: Send + Sync {
    fn apply_image(&self, image: Raster, rng: &mut dyn RngCore) -> Result<Raster, TransformError>;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Runs a [`PhotometricTransform`] on the image and passes keypoints through.
#[derive(Debug, Clone)]
pub struct ImageOnly<T> {
    inner: T,
}

/// Wrap an image-only transform so it can sit in a [`Compose`](super::Compose).
pub fn image_only<T: PhotometricTransform>(inner: T) -> ImageOnly<T> {
    ImageOnly { inner }
}

impl<T> ImageOnly<T> {
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: PhotometricTransform> KeypointTransform for ImageOnly<T> {
    fn apply(
        &self,
        input: LabeledImage,
        _state: &mut TransformState,
        rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        let LabeledImage { image, keypoints } = input;
        let (width, height) = image.dimensions();
        let image = self.inner.apply_image(image, rng)?;

        if image.dimensions() != (width, height) {
            return Err(TransformError::CorruptedImage(format!(
                "{} changed image size from {}x{} to {}x{}",
                self.inner.name(),
                width,
                height,
                image.width,
                image.height
            )));
        }

        Ok(LabeledImage { image, keypoints })
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Random brightness, contrast and saturation changes.
///
/// Each strength `s` yields a factor drawn uniformly from
/// `[max(0, 1 - s), 1 + s]`. A strength of zero leaves that property alone.
/// Adjustments run in the order brightness, contrast, saturation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorJitter {
    brightness: f32,
    contrast: f32,
    saturation: f32,
}

impl ColorJitter {
    pub fn new(brightness: f32, contrast: f32, saturation: f32) -> Result<Self, TransformError> {
        for (label, value) in [
            ("brightness", brightness),
            ("contrast", contrast),
            ("saturation", saturation),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TransformError::config(format!(
                    "{} strength must be non-negative, got {}",
                    label, value
                )));
            }
        }
        Ok(Self {
            brightness,
            contrast,
            saturation,
        })
    }

    fn sample_factor(strength: f32, rng: &mut dyn RngCore) -> f32 {
        if strength == 0.0 {
            return 1.0;
        }
        rng.random_range((1.0 - strength).max(0.0)..=1.0 + strength)
    }
}

/// ITU-R BT.601 luma.
fn gray(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

fn to_byte(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Scale every channel by `factor`.
pub fn adjust_brightness(image: &mut Raster, factor: f32) {
    for value in image.pixels.iter_mut() {
        *value = to_byte(*value as f32 * factor);
    }
}

/// Blend each pixel with the mean gray level of the image.
pub fn adjust_contrast(image: &mut Raster, factor: f32) {
    if image.is_empty() {
        return;
    }
    let total: f64 = image
        .pixels
        .chunks_exact(3)
        .map(|p| gray(p[0] as f32, p[1] as f32, p[2] as f32) as f64)
        .sum();
    let mean = (total / image.pixel_count() as f64) as f32;

    for value in image.pixels.iter_mut() {
        *value = to_byte(mean + (*value as f32 - mean) * factor);
    }
}

/// Blend each pixel with its own gray value.
pub fn adjust_saturation(image: &mut Raster, factor: f32) {
    for pixel in image.pixels.chunks_exact_mut(3) {
        let (r, g, b) = (pixel[0] as f32, pixel[1] as f32, pixel[2] as f32);
        let l = gray(r, g, b);
        pixel[0] = to_byte(l + (r - l) * factor);
        pixel[1] = to_byte(l + (g - l) * factor);
        pixel[2] = to_byte(l + (b - l) * factor);
    }
}

impl PhotometricTransform for ColorJitter {
    fn apply_image(
        &self,
        mut image: Raster,
        rng: &mut dyn RngCore,
    ) -> Result<Raster, TransformError> {
        let brightness = Self::sample_factor(self.brightness, rng);
        let contrast = Self::sample_factor(self.contrast, rng);
        let saturation = Self::sample_factor(self.saturation, rng);

        if brightness != 1.0 {
            adjust_brightness(&mut image, brightness);
        }
        if contrast != 1.0 {
            adjust_contrast(&mut image, contrast);
        }
        if saturation != 1.0 {
            adjust_saturation(&mut image, saturation);
        }
        Ok(image)
    }

    fn name(&self) -> &'static str {
        "ColorJitter"
    }
}
