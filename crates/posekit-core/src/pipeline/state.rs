//! Side-channel metadata threaded through a pipeline run.

use crate::keypoint::CropWindow;
use crate::raster::Raster;

/// Values derived by transforms that later stages or the caller may need.
///
/// Any transform that changes output geometry updates `size`, so a stage
/// reading it always sees the dimensions of its own input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformState {
    /// Current (width, height) of the image.
    pub size: Option<(u32, u32)>,
    /// Accumulated per-axis (x, y) scale factor from the original image.
    pub scale: Option<(f64, f64)>,
    /// Accumulated depth value. 2D transforms carry it unchanged.
    pub depth: Option<f64>,
    /// Most recent crop window, in the coordinates of the image it was taken from.
    pub crop: Option<CropWindow>,
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State seeded with the dimensions of `image`.
    pub fn for_image(image: &Raster) -> Self {
        Self {
            size: Some(image.dimensions()),
            ..Self::default()
        }
    }

    pub fn record_size(&mut self, image: &Raster) {
        self.size = Some(image.dimensions());
    }

    /// Multiply the accumulated scale by `(sx, sy)`.
    pub fn record_scale(&mut self, sx: f64, sy: f64) {
        let (ax, ay) = self.scale.unwrap_or((1.0, 1.0));
        self.scale = Some((ax * sx, ay * sy));
    }

    pub fn record_crop(&mut self, window: CropWindow) {
        self.crop = Some(window);
    }
}
