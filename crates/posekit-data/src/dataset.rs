//! Keypoint dataset producing model-ready samples.

use std::path::PathBuf;

use log::{debug, info, warn};
use ndarray::{Array1, Array3};
use posekit_core::pipeline::{Compose, KeypointTransform, ResizedCrop, TransformState};
use posekit_core::raster::load_raster;
use posekit_core::{
    to_normalized_tensor, to_tensor, BoundingBox, CropWindow, GaussianTarget, Keypoint,
    LabeledImage, ResizeTarget, TargetGenerator, TransformError,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::annotation::{self, SampleRecord};
use crate::config::{CropWindowMode, DatasetConfig};
use crate::error::{DatasetError, DatasetResult};

/// Everything about a fetched sample besides its tensors.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMeta {
    pub image_path: PathBuf,
    pub species: String,
    pub id: String,
    /// Keypoints in the coordinates of the output image.
    pub keypoints: Vec<Keypoint>,
    /// Keypoints as annotated on the source image.
    pub original_keypoints: Vec<Keypoint>,
    pub visibility: Vec<f32>,
    /// Geometry recorded while transforming the sample.
    pub state: TransformState,
}

/// One training sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetItem {
    /// `(3, H, W)` image tensor.
    pub image: Array3<f32>,
    /// `(N, heatmap_h, heatmap_w)` heatmap targets.
    pub target: Array3<f32>,
    /// Per-keypoint loss weight.
    pub target_weight: Array1<f32>,
    pub meta: SampleMeta,
}

/// Largest side of an unclamped crop window.
pub const MAX_WINDOW_SIDE: u32 = 16_384;

/// Square window of side `scale * max(w, h)` centered on `bbox`.
///
/// `Clamped` shrinks the side to fit the image and shifts the window inside
/// it. `Unclamped` leaves the window where it falls, as long as its side is
/// at most [`MAX_WINDOW_SIDE`] and its origin fits in an `i32`.
pub fn crop_window(
    bbox: &BoundingBox,
    width: u32,
    height: u32,
    scale: f64,
    mode: CropWindowMode,
) -> Result<CropWindow, TransformError> {
    let (cx, cy) = bbox.center();
    let mut side = (scale * bbox.width().max(bbox.height())).round().max(1.0);
    if !(cx.is_finite() && cy.is_finite() && side.is_finite()) {
        return Err(TransformError::InvalidConfig(format!(
            "crop window around ({}, {}) with side {} is not finite",
            cx, cy, side
        )));
    }

    if mode == CropWindowMode::Clamped {
        side = side.min(width as f64).min(height as f64).max(1.0);
    }

    let mut left = (cx - side / 2.0).round();
    let mut top = (cy - side / 2.0).round();

    match mode {
        CropWindowMode::Clamped => {
            left = left.clamp(0.0, (width as f64 - side).max(0.0));
            top = top.clamp(0.0, (height as f64 - side).max(0.0));
        }
        CropWindowMode::Unclamped => {
            let limit = i32::MAX as f64;
            if side > MAX_WINDOW_SIDE as f64 || left.abs() > limit || top.abs() > limit {
                return Err(TransformError::InvalidConfig(format!(
                    "crop window at ({}, {}) with side {} is out of range",
                    left, top, side
                )));
            }
        }
    }

    Ok(CropWindow::new(left as i64, top as i64, side as u32, side as u32))
}

struct Entry {
    species: String,
    id: String,
    /// `None` when the annotation failed to parse at construction time.
    record: Option<SampleRecord>,
}

/// Per-species animal keypoint dataset.
///
/// Construction scans the index files and parses every annotation once.
/// Samples whose annotation cannot be read stay in the index and report
/// their error when fetched.
pub struct KeypointDataset {
    config: DatasetConfig,
    entries: Vec<Entry>,
    pipeline: Compose,
    generator: Box<dyn TargetGenerator>,
}

impl KeypointDataset {
    pub fn new(config: DatasetConfig) -> DatasetResult<Self> {
        config.validate()?;
        let generator = GaussianTarget::new(config.sigma)
            .map_err(|e| DatasetError::Config(e.to_string()))?;

        let species = if config.species.is_empty() {
            annotation::discover_species(&config.root, &config.index_file)?
        } else {
            config.species.clone()
        };

        let mut entries = Vec::new();
        let mut failed = 0;
        for name in &species {
            let index_path = config.root.join(name).join(&config.index_file);
            for id in annotation::read_index(&index_path)? {
                let record = annotation::load_record(&config, name, &id)
                    .inspect_err(|err| {
                        failed += 1;
                        warn!("annotation for {}/{} is unusable: {}", name, id, err);
                    })
                    .ok();
                entries.push(Entry {
                    species: name.clone(),
                    id,
                    record,
                });
            }
        }

        info!(
            "indexed {} samples from {} species under {} ({} unusable)",
            entries.len(),
            species.len(),
            config.root.display(),
            failed
        );

        Ok(Self {
            config,
            entries,
            pipeline: Compose::default(),
            generator: Box::new(generator),
        })
    }

    /// Transforms applied after the bounding-box crop.
    pub fn with_pipeline(mut self, pipeline: Compose) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_target_generator(mut self, generator: impl TargetGenerator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records that parsed successfully at construction.
    pub fn records(&self) -> impl Iterator<Item = &SampleRecord> {
        self.entries.iter().filter_map(|e| e.record.as_ref())
    }

    /// The record at `index`, re-reading its files if they failed to parse.
    pub fn record(&self, index: usize) -> DatasetResult<SampleRecord> {
        let entry = self.entries.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })?;
        match &entry.record {
            Some(record) => Ok(record.clone()),
            None => annotation::load_record(&self.config, &entry.species, &entry.id),
        }
    }

    /// Crop window for a box on a `width x height` image, using the configured mode.
    pub fn crop_window(
        &self,
        bbox: &BoundingBox,
        width: u32,
        height: u32,
    ) -> Result<CropWindow, TransformError> {
        crop_window(
            bbox,
            width,
            height,
            self.config.window_scale,
            self.config.crop_mode,
        )
    }

    /// Fetch sample `index`, drawing randomness from `rng`.
    pub fn get(&self, index: usize, rng: &mut dyn RngCore) -> DatasetResult<DatasetItem> {
        let record = self.record(index)?;
        let key = record.key();
        let transform_err = |source: TransformError| DatasetError::Transform {
            id: key.clone(),
            source,
        };

        let raster = load_raster(&record.image_path).map_err(|e| match e {
            TransformError::Decode(source) => DatasetError::Image {
                path: record.image_path.clone(),
                source,
            },
            other => transform_err(other),
        })?;
        let (width, height) = raster.dimensions();

        let window = self
            .crop_window(&record.bbox, width, height)
            .map_err(transform_err)?;
        let (out_w, out_h) = self.config.image_size;
        let crop = ResizedCrop::new(window, ResizeTarget::Exact(out_w, out_h), self.config.filter);

        let mut state = TransformState::for_image(&raster);
        let input = LabeledImage::new(raster, record.keypoints.clone());
        let cropped = crop.apply(input, &mut state, rng).map_err(transform_err)?;
        let output = self
            .pipeline
            .apply(cropped, &mut state, rng)
            .map_err(transform_err)?;
        output
            .ensure_keypoint_count(self.config.num_keypoints)
            .map_err(transform_err)?;

        let (target, target_weight) = self
            .generator
            .generate_target(
                &output.keypoints,
                &record.visibility,
                self.config.heatmap_size,
                output.image.dimensions(),
            )
            .map_err(transform_err)?;

        let image = if self.config.normalize {
            to_normalized_tensor(&output.image, self.config.mean, self.config.std)
        } else {
            to_tensor(&output.image)
        }
        .map_err(transform_err)?;

        debug!(
            "fetched {} (window {:?}, {} weighted keypoints)",
            key,
            window,
            target_weight.iter().filter(|&&w| w > 0.0).count()
        );

        Ok(DatasetItem {
            image,
            target,
            target_weight,
            meta: SampleMeta {
                image_path: record.image_path,
                species: record.species,
                id: record.id,
                keypoints: output.keypoints,
                original_keypoints: record.keypoints,
                visibility: record.visibility,
                state,
            },
        })
    }

    /// Fetch with a generator seeded from `seed`, for reproducible loading.
    pub fn get_seeded(&self, index: usize, seed: u64) -> DatasetResult<DatasetItem> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.get(index, &mut rng)
    }
}

impl std::fmt::Debug for KeypointDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypointDataset")
            .field("root", &self.config.root)
            .field("len", &self.entries.len())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
