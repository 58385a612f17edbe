//! Deterministic pipeline stages wrapping the geometric primitives.

use rand::RngCore;

use super::{KeypointTransform, TransformState};
use crate::keypoint::{CropWindow, LabeledImage};
use crate::raster::{longer_side_dimensions, FilterType};
use crate::transform::{self, ResizeTarget};
use crate::TransformError;

/// Record the size and per-axis scale change between two image sizes.
pub(crate) fn record_resize(state: &mut TransformState, before: (u32, u32), after: (u32, u32)) {
    state.record_scale(
        after.0 as f64 / before.0 as f64,
        after.1 as f64 / before.1 as f64,
    );
    state.size = Some(after);
}

/// Resize to a fixed size or match the shorter side.
#[derive(Debug, Clone, Copy)]
pub struct Resize {
    target: ResizeTarget,
    filter: FilterType,
}

impl Resize {
    pub fn new(target: ResizeTarget, filter: FilterType) -> Self {
        Self { target, filter }
    }
}

impl KeypointTransform for Resize {
    fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        _rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        let before = input.image.dimensions();
        let output = transform::resize(input, self.target, self.filter)?;
        record_resize(state, before, output.image.dimensions());
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "Resize"
    }
}

/// Crop a fixed window.
#[derive(Debug, Clone, Copy)]
pub struct Crop {
    window: CropWindow,
}

impl Crop {
    pub fn new(window: CropWindow) -> Self {
        Self { window }
    }
}

impl KeypointTransform for Crop {
    fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        _rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        let w = self.window;
        let output = transform::crop(input, w.top, w.left, w.height, w.width)?;
        state.record_crop(w);
        state.record_size(&output.image);
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "Crop"
    }
}

/// Crop a fixed window, then resize it.
#[derive(Debug, Clone, Copy)]
pub struct ResizedCrop {
    window: CropWindow,
    target: ResizeTarget,
    filter: FilterType,
}

impl ResizedCrop {
    pub fn new(window: CropWindow, target: ResizeTarget, filter: FilterType) -> Self {
        Self {
            window,
            target,
            filter,
        }
    }
}

impl KeypointTransform for ResizedCrop {
    fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        _rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        apply_resized_crop(input, self.window, self.target, self.filter, state)
    }

    fn name(&self) -> &'static str {
        "ResizedCrop"
    }
}

/// Shared by `ResizedCrop` and `RandomResizedCrop`.
pub(crate) fn apply_resized_crop(
    input: LabeledImage,
    w: CropWindow,
    target: ResizeTarget,
    filter: FilterType,
    state: &mut TransformState,
) -> Result<LabeledImage, TransformError> {
    let output =
        transform::resized_crop(input, w.top, w.left, w.height, w.width, target, filter)?;
    state.record_crop(w);
    record_resize(state, (w.width, w.height), output.image.dimensions());
    Ok(output)
}

/// Crop the central region of the given size.
#[derive(Debug, Clone, Copy)]
pub struct CenterCrop {
    width: u32,
    height: u32,
}

impl CenterCrop {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl KeypointTransform for CenterCrop {
    fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        _rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        let output = transform::center_crop(input, self.width, self.height)?;
        state.record_size(&output.image);
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "CenterCrop"
    }
}

/// Mirror left-right. Landmark indices are not swapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalFlip;

impl KeypointTransform for HorizontalFlip {
    fn apply(
        &self,
        input: LabeledImage,
        _state: &mut TransformState,
        _rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        transform::horizontal_flip(input)
    }

    fn name(&self) -> &'static str {
        "HorizontalFlip"
    }
}

/// Mirror top-bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalFlip;

impl KeypointTransform for VerticalFlip {
    fn apply(
        &self,
        input: LabeledImage,
        _state: &mut TransformState,
        _rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        transform::vertical_flip(input)
    }

    fn name(&self) -> &'static str {
        "VerticalFlip"
    }
}

/// Rotate by a fixed angle in degrees.
#[derive(Debug, Clone, Copy)]
pub struct Rotate {
    angle: f64,
    filter: FilterType,
    fill: [u8; 3],
}

impl Rotate {
    pub fn new(angle: f64, filter: FilterType) -> Self {
        Self {
            angle,
            filter,
            fill: [0, 0, 0],
        }
    }

    pub fn with_fill(mut self, fill: [u8; 3]) -> Self {
        self.fill = fill;
        self
    }
}

impl KeypointTransform for Rotate {
    fn apply(
        &self,
        input: LabeledImage,
        _state: &mut TransformState,
        _rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        transform::rotate(input, self.angle, self.filter, self.fill)
    }

    fn name(&self) -> &'static str {
        "Rotate"
    }
}

/// Letterbox to a `size x size` square.
#[derive(Debug, Clone, Copy)]
pub struct ResizePad {
    size: u32,
    filter: FilterType,
    fill: [u8; 3],
}

impl ResizePad {
    pub fn new(size: u32, filter: FilterType) -> Self {
        Self {
            size,
            filter,
            fill: [0, 0, 0],
        }
    }

    pub fn with_fill(mut self, fill: [u8; 3]) -> Self {
        self.fill = fill;
        self
    }
}

impl KeypointTransform for ResizePad {
    fn apply(
        &self,
        input: LabeledImage,
        state: &mut TransformState,
        _rng: &mut dyn RngCore,
    ) -> Result<LabeledImage, TransformError> {
        let (w, h) = input.image.dimensions();
        let output = transform::resize_pad(input, self.size, self.filter, self.fill)?;

        // Padding adds no scale; only the resize before it counts
        let (new_w, new_h) = longer_side_dimensions(w, h, self.size);
        state.record_scale(new_w as f64 / w as f64, new_h as f64 / h as f64);
        state.record_size(&output.image);
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "ResizePad"
    }
}
