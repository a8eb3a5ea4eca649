//! PPE compliance inspection.
//!
//! An image goes through a YOLO detector, detections are classified against a fixed PPE
//! taxonomy, and the result is a violation report, an annotated copy of the image and a safety
//! message that can optionally be spoken.

pub mod annotations;
pub mod audio;
pub mod config;
pub mod error;
pub mod image_utils;
pub mod inspection;
pub mod object_detection;
pub mod service;
pub mod storage;
pub mod upload;

pub use annotations::bounding_box::BoundingBox;
pub use annotations::detection::Detection;
pub use annotations::taxonomy::TaxonomyLabel;
pub use config::InspectorConfig;
pub use error::{PipelineError, UploadError};
pub use inspection::batch::{DetectionBatch, SafetyStatus};
pub use inspection::message::SafetyMessage;
pub use inspection::pipeline::{InspectionOutcome, Pipeline, PipelineSettings};
pub use object_detection::object_detection_model::{ObjectDetectionModel, RawDetection};
