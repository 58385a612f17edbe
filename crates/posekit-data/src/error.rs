//! Errors raised while scanning or fetching dataset samples.

use std::path::PathBuf;

use posekit_core::TransformError;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

/// Every per-sample variant names the offending path or sample id.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image decode error at {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("json parse error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed annotation {path}:{line}: {message}")]
    Annotation {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("transform failed for sample {id}: {source}")]
    Transform {
        id: String,
        #[source]
        source: TransformError,
    },
    #[error("invalid dataset config: {0}")]
    Config(String),
    #[error("sample index {index} out of range for dataset of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn annotation(
        path: impl Into<PathBuf>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        DatasetError::Annotation {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
