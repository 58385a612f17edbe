//! Posekit Data - animal keypoint datasets
//!
//! Reads per-species annotation folders, crops each sample around its
//! bounding box, runs a [`posekit_core::pipeline::Compose`] pipeline and renders
//! heatmap targets. The library logs through the `log` facade and installs no
//! logger of its own.

pub mod annotation;
pub mod config;
pub mod dataset;
pub mod error;

pub use annotation::SampleRecord;
pub use config::{CropWindowMode, DatasetConfig};
pub use dataset::{crop_window, DatasetItem, KeypointDataset, SampleMeta, MAX_WINDOW_SIDE};
pub use error::{DatasetError, DatasetResult};
