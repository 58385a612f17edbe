//! Dataset configuration.

use std::path::{Path, PathBuf};

use posekit_core::{FilterType, IMAGENET_MEAN, IMAGENET_STD};
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};

/// How the square crop window around a bounding box meets the image border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropWindowMode {
    /// Shrink the side to fit the image, then shift the window inside it.
    #[default]
    Clamped,
    /// Keep the window centered on the box; the outside is zero-filled.
    Unclamped,
}

/// Settings for [`KeypointDataset`](crate::KeypointDataset).
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Directory holding one subdirectory per species.
    pub root: PathBuf,
    /// Species to load. Empty means every subdirectory that has an index file.
    pub species: Vec<String>,
    /// Index file name inside each species directory.
    pub index_file: String,
    /// Image extensions tried in order when resolving `images/<id>.<ext>`.
    pub image_extensions: Vec<String>,
    pub num_keypoints: usize,
    /// Network input (width, height).
    pub image_size: (u32, u32),
    /// Heatmap (width, height).
    pub heatmap_size: (u32, u32),
    /// Gaussian sigma in heatmap pixels.
    pub sigma: f64,
    /// Crop side relative to the longer bounding box side.
    pub window_scale: f64,
    pub crop_mode: CropWindowMode,
    pub filter: FilterType,
    /// Apply `mean`/`std` after scaling pixels to `[0, 1]`.
    pub normalize: bool,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            species: Vec::new(),
            index_file: "train.txt".to_string(),
            image_extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            num_keypoints: 18,
            image_size: (256, 256),
            heatmap_size: (64, 64),
            sigma: 2.0,
            window_scale: 1.25,
            crop_mode: CropWindowMode::Clamped,
            filter: FilterType::Bilinear,
            normalize: true,
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }
}

impl DatasetConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load and validate a config file.
    pub fn from_json_file(path: &Path) -> DatasetResult<Self> {
        let raw = std::fs::read(path).map_err(|e| DatasetError::io(path, e))?;
        let config: Self = serde_json::from_slice(&raw).map_err(|e| DatasetError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DatasetResult<()> {
        let fail = |msg: String| Err(DatasetError::Config(msg));

        if self.index_file.trim().is_empty() {
            return fail("index_file must not be empty".into());
        }
        if self.image_extensions.is_empty() {
            return fail("image_extensions must list at least one extension".into());
        }
        if self.num_keypoints == 0 {
            return fail("num_keypoints must be positive".into());
        }
        let sizes = [
            ("image_size", self.image_size),
            ("heatmap_size", self.heatmap_size),
        ];
        for (label, (w, h)) in sizes {
            if w == 0 || h == 0 {
                return fail(format!("{} must be non-zero, got {}x{}", label, w, h));
            }
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return fail(format!("sigma must be positive, got {}", self.sigma));
        }
        if !self.window_scale.is_finite() || self.window_scale <= 0.0 {
            return fail(format!("window_scale must be positive, got {}", self.window_scale));
        }
        if self.std.iter().any(|&s| !s.is_finite() || s <= 0.0) {
            return fail(format!("std must be positive, got {:?}", self.std));
        }
        Ok(())
    }
}
