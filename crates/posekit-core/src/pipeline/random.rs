//! Transforms whose parameters are drawn per call.
//!
//! All sampling goes through the `rng` handed to `apply`. Construction
//! validates arguments and fails with `TransformError::InvalidConfig`, so a
//! transform that exists can always be applied.

use log::debug;
use rand::{Rng, RngCore};

use super::geometric::{apply_resized_crop, HorizontalFlip};
use super::{KeypointTransform, TransformState};
use crate::keypoint::{CropWindow, LabeledImage};
use crate::raster::{FilterType, Raster};
use crate::transform::{self, ResizeTarget};
use crate::TransformError;

/// Rotate by an angle drawn uniformly from `[low, high]`.
#[derive(Debug, Clone, Copy)]
pub struct RandomRotation {
    low: f64,
    high: f64,
    filter: FilterType,
    fill: [u8; 3],
}

impl RandomRotation {
    /// Symmetric range `[-degrees, degrees]`.
    ///
    /// # Errors
    ///
    /// `degrees` must be finite and non-negative.
    pub fn new(degrees: f64) -> Result<Self, TransformError> {
        if !degrees.is_finite() || degrees < 0.0 {
            return Err(TransformError::config(format!(
                "rotation degrees must be a non-negative number, got {}",
                degrees
            )));
        }
        Ok(Self::with_bounds(-degrees, degrees))
    }

    /// Explicit range given as exactly two bounds `[low, high]`.
    pub fn from_range(bounds: &[f64]) -> Result<Self, TransformError> {
        let &[low, high] = bounds else {
            return Err(TransformError::config(format!(
                "rotation range must have exactly two bounds, got {}",
                bounds.len()
            )));
        };
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(TransformError::config(format!(
                "invalid rotation range [{}, {}]",
                low, high
            )));
        }
        Ok(Self::with_bounds(low, high))
    }

    fn with_bounds(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            filter: FilterType::Bilinear,
            fill: [0, 0, 0],
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_fill(mut self, fill: [u8; 3]) -> Self {
        self.fill = fill;
        self
    }

    /// Draw an angle in degrees.
    pub fn sample_angle(&self, rng: &mut dyn RngCore) -> f64 {
        if self.low == self.high {
            return self.low;
        }
        rng.random_range(self.low..=self.high)
    }
}

impl KeypointTransform for RandomRotation {
    fn apply(
        &self,
        input: LabeledImage,
        _state: &mut TransformState,
        rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        let angle = self.sample_angle(rng);
        transform::rotate(input, angle, self.filter, self.fill)
    }

    fn name(&self) -> &'static str {
        "RandomRotation"
    }
}

/// Crop a random square region and resize it to a fixed size.
///
/// The crop is always square: the side is `sqrt(fraction * area)` with the
/// area fraction drawn from `scale`. No aspect-ratio range is sampled.
#[derive(Debug, Clone, Copy)]
pub struct RandomResizedCrop {
    size: (u32, u32),
    scale: (f64, f64),
    filter: FilterType,
}

impl RandomResizedCrop {
    /// Area fraction range used by `new`.
    pub const DEFAULT_SCALE: (f64, f64) = (0.6, 0.9);

    /// Number of sampling attempts before falling back to the full image.
    pub const MAX_ATTEMPTS: usize = 10;

    /// Output `(width, height)`, area fraction range `scale`.
    ///
    /// # Errors
    ///
    /// The output size must be non-zero and the scale range must satisfy
    /// `0 < low <= high`.
    pub fn new(
        size: (u32, u32),
        scale: (f64, f64),
        filter: FilterType,
    ) -> Result<Self, TransformError> {
        if size.0 == 0 || size.1 == 0 {
            return Err(TransformError::config(format!(
                "output size must be non-zero, got {}x{}",
                size.0, size.1
            )));
        }
        let (low, high) = scale;
        if !low.is_finite() || !high.is_finite() || low <= 0.0 || low > high {
            return Err(TransformError::config(format!(
                "invalid crop scale range ({}, {})",
                low, high
            )));
        }
        Ok(Self {
            size,
            scale,
            filter,
        })
    }

    /// Default scale range with bilinear filtering.
    pub fn with_size(size: (u32, u32)) -> Result<Self, TransformError> {
        Self::new(size, Self::DEFAULT_SCALE, FilterType::Bilinear)
    }

    /// Pick the crop window for a `width x height` image.
    ///
    /// Tries `MAX_ATTEMPTS` times to fit a square of the sampled area inside
    /// the image, with a uniformly drawn top-left corner. When no attempt fits,
    /// the whole image is used.
    pub fn get_params(&self, width: u32, height: u32, rng: &mut dyn RngCore) -> CropWindow {
        let area = width as f64 * height as f64;

        for _ in 0..Self::MAX_ATTEMPTS {
            let fraction = rng.random_range(self.scale.0..=self.scale.1);
            let side = (fraction * area).sqrt().round_ties_even() as u32;

            if side > 0 && side <= width && side <= height {
                let top = rng.random_range(0..=height - side);
                let left = rng.random_range(0..=width - side);
                return CropWindow::new(left as i64, top as i64, side, side);
            }
        }

        debug!(
            "no square crop of scale {:?} fits {}x{}, using the full image",
            self.scale, width, height
        );
        CropWindow::full(width, height)
    }
}

impl KeypointTransform for RandomResizedCrop {
    fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        let window = self.get_params(input.image.width, input.image.height, rng);
        let target = ResizeTarget::Exact(self.size.0, self.size.1);
        apply_resized_crop(input, window, target, self.filter, state)
    }

    fn name(&self) -> &'static str {
        "RandomResizedCrop"
    }
}

/// Apply a list of transforms with probability `p`.
///
/// A single draw gates the whole list: either every transform runs in
/// order, or the input is returned unchanged.
pub struct RandomApply {
    transforms: Vec<Box<dyn KeypointTransform>>,
    p: f64,
}

impl RandomApply {
    pub fn new(
        transforms: Vec<Box<dyn KeypointTransform>>,
        p: f64,
    ) -> Result<Self, TransformError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(TransformError::config(format!(
                "probability must be in [0.0, 1.0], got {}",
                p
            )));
        }
        Ok(Self { transforms, p })
    }

    pub fn probability(&self) -> f64 {
        self.p
    }
}

impl std::fmt::Debug for RandomApply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.transforms.iter().map(|t| t.name()).collect();
        f.debug_struct("RandomApply")
            .field("transforms", &names)
            .field("p", &self.p)
            .finish()
    }
}

impl KeypointTransform for RandomApply {
    fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        if !rng.random_bool(self.p) {
            return Ok(input);
        }

        let mut current = input;
        for transform in &self.transforms {
            current = transform.apply(current, state, rng)?;
        }
        Ok(current)
    }

    fn name(&self) -> &'static str {
        "RandomApply"
    }
}

/// Horizontal flip with probability `p`.
#[derive(Debug, Clone, Copy)]
pub struct RandomHorizontalFlip {
    p: f64,
}

impl RandomHorizontalFlip {
    pub fn new(p: f64) -> Result<Self, TransformError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(TransformError::config(format!(
                "probability must be in [0.0, 1.0], got {}",
                p
            )));
        }
        Ok(Self { p })
    }
}

impl KeypointTransform for RandomHorizontalFlip {
    fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        if rng.random_bool(self.p) {
            HorizontalFlip.apply(input, state, rng)
        } else {
            Ok(input)
        }
    }

    fn name(&self) -> &'static str {
        "RandomHorizontalFlip"
    }
}

/// Gaussian blur with a sigma drawn uniformly from `[low, high]`.
///
/// Photometric only: keypoints pass through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct GaussianBlur {
    low: f32,
    high: f32,
}

impl GaussianBlur {
    pub fn new(low: f32, high: f32) -> Result<Self, TransformError> {
        if !low.is_finite() || !high.is_finite() || low < 0.0 || low > high {
            return Err(TransformError::config(format!(
                "invalid blur radius range [{}, {}]",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    pub fn sample_sigma(&self, rng: &mut dyn RngCore) -> f32 {
        if self.low == self.high {
            return self.low;
        }
        rng.random_range(self.low..=self.high)
    }
}

/// Blur a raster. A non-positive sigma returns a copy.
pub fn blur_raster(image: &Raster, sigma: f32) -> Result<Raster, TransformError> {
    if sigma <= 0.0 {
        return Ok(image.clone());
    }
    let rgb = image.to_rgb_image()?;
    Ok(Raster::from_rgb_image(image::imageops::blur(&rgb, sigma)))
}

impl KeypointTransform for GaussianBlur {
    fn apply(
        &self,
        input: LabeledImage,
        _state: &mut TransformState,
        rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        let sigma = self.sample_sigma(rng);
        let image = blur_raster(&input.image, sigma)?;
        Ok(LabeledImage {
            image,
            keypoints: input.keypoints,
        })
    }

    fn name(&self) -> &'static str {
        "GaussianBlur"
    }
}
