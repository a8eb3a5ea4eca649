use crate::annotations::detection::Detection;
use serde::Serialize;
use std::fmt;

/// Overall verdict for one image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SafetyStatus {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "VIOLATION DETECTED")]
    Violation,
}

impl fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyStatus::Safe => f.write_str("SAFE"),
            SafetyStatus::Violation => f.write_str("VIOLATION DETECTED"),
        }
    }
}

/// Everything the classifier learned about one image.
///
/// Only built through [`DetectionBatch::from_detections`], which derives `violations` and the
/// status from `detections`, so `status() == Violation` exactly when `violations()` is non-empty.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionBatch {
    detections: Vec<Detection>,
    violations: Vec<Detection>,
    status: SafetyStatus,
    image_dimensions: (u32, u32),
}

impl DetectionBatch {
    /// `image_dimensions` is `(height, width)`.
    pub(crate) fn from_detections(
        detections: Vec<Detection>,
        image_dimensions: (u32, u32),
    ) -> Self {
        let violations: Vec<Detection> = detections
            .iter()
            .filter(|det| det.is_violation())
            .cloned()
            .collect();
        let status = if violations.is_empty() {
            SafetyStatus::Safe
        } else {
            SafetyStatus::Violation
        };
        DetectionBatch {
            detections,
            violations,
            status,
            image_dimensions,
        }
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn violations(&self) -> &[Detection] {
        &self.violations
    }

    pub fn status(&self) -> SafetyStatus {
        self.status
    }

    pub fn image_dimensions(&self) -> (u32, u32) {
        self.image_dimensions
    }
}
