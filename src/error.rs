use std::path::PathBuf;
use thiserror::Error;

/// Raised when a bounding box is built from inverted coordinates.
#[derive(Debug, Error, PartialEq)]
pub enum BoundingBoxError {
    #[error("Failed to create BoundingBox, value for left > value for right ({left} > {right}).")]
    InvertedHorizontal { left: f32, right: f32 },
    #[error("Failed to create BoundingBox, value for top > value for bottom ({top} > {bottom}).")]
    InvertedVertical { top: f32, bottom: f32 },
}

/// Failures inside the detector collaborator.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Ort(#[from] ort::Error),
    #[error("unexpected detector output shape {0:?}, expected [1, 4 + classes, predictions]")]
    OutputShape(Vec<usize>),
    #[error("inference session lock poisoned")]
    SessionPoisoned,
}

/// Request-level failures of the inspection pipeline.
///
/// Only these abort a request. Unknown class indices, speech failures and
/// storage failures degrade locally and never show up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not read image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("detector failed: {0}")]
    Inference(#[from] InferenceError),
}

/// Reasons an upload is refused before it reaches the pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No file selected")]
    NoFileSelected,
    #[error("Invalid file type: {filename}")]
    UnsupportedExtension { filename: String },
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to launch speech program {program:?}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("speech program {program:?} exited with {status}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode result image: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{key} has an invalid value {value:?}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("{0}")]
    Invalid(String),
}
