//! Keypoints, bounding boxes and the (image, keypoints) pair.
//!
//! Coordinates are in pixel-index space: the center of pixel `(i, j)` sits at
//! `(i as f64, j as f64)`. The position of a keypoint in its list is its
//! landmark identity; transforms never reorder, add or remove points.

use serde::{Deserialize, Serialize};

use crate::raster::Raster;
use crate::TransformError;

/// A 2D landmark location.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether the point lies inside a `width x height` raster.
    pub fn is_inside(&self, width: u32, height: u32) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x < width as f64 && self.y < height as f64
    }
}

/// An image together with the keypoints annotated on it.
///
/// This is the value every keypoint-aware transform consumes and produces.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledImage {
    pub image: Raster,
    pub keypoints: Vec<Keypoint>,
}

impl LabeledImage {
    pub fn new(image: Raster, keypoints: Vec<Keypoint>) -> Self {
        Self { image, keypoints }
    }

    /// Fail when the number of keypoints differs from `expected`.
    pub fn ensure_keypoint_count(&self, expected: usize) -> Result<(), TransformError> {
        if self.keypoints.len() != expected {
            return Err(TransformError::KeypointCount {
                expected,
                actual: self.keypoints.len(),
            });
        }
        Ok(())
    }
}

/// Axis-aligned box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Tight box around the given points. Returns `None` for an empty slice.
    pub fn from_keypoints(points: &[Keypoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Self::new(first.x, first.y, first.x, first.y);
        Some(points.iter().skip(1).fold(init, |b, p| {
            Self::new(
                b.left.min(p.x),
                b.top.min(p.y),
                b.right.max(p.x),
                b.bottom.max(p.y),
            )
        }))
    }

    /// Tight box around the points whose visibility flag is positive.
    pub fn from_visible_keypoints(points: &[Keypoint], visibility: &[f32]) -> Option<Self> {
        let visible: Vec<Keypoint> = points
            .iter()
            .zip(visibility)
            .filter(|(_, v)| **v > 0.0)
            .map(|(p, _)| *p)
            .collect();
        Self::from_keypoints(&visible)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }
}

/// Integer crop window. `left`/`top` may be negative and the window may
/// extend past the image; pixels outside the source are zero-filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    pub left: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

impl CropWindow {
    pub fn new(left: i64, top: i64, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The window covering a whole `width x height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}
