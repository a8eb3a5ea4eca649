use crate::annotations::detection::Detection;
use crate::annotations::taxonomy::TaxonomyLabel;
use crate::inspection::batch::SafetyStatus;
use crate::inspection::message::SafetyMessage;
use crate::inspection::pipeline::InspectionOutcome;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::path::PathBuf;

/// One detection as it appears in a response.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetectionReport {
    pub class_name: TaxonomyLabel,
    pub confidence: f64,
    pub bbox: [i32; 4],
}

impl From<&Detection> for DetectionReport {
    fn from(detection: &Detection) -> Self {
        DetectionReport {
            class_name: detection.label(),
            confidence: detection.reported_confidence(),
            bbox: detection.reported_box(),
        }
    }
}

/// The JSON body returned for a successfully inspected upload.
#[derive(Clone, Debug, Serialize)]
pub struct InspectionReport {
    pub success: bool,
    pub safety_status: SafetyStatus,
    pub safety_message: SafetyMessage,
    pub violations_count: usize,
    pub total_detections: usize,
    pub detections: Vec<DetectionReport>,
    pub violations: Vec<DetectionReport>,
    /// `(height, width)` of the canonical image the boxes refer to.
    pub image_dimensions: (u32, u32),
    /// Base64 of the annotated JPEG.
    pub result_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<PathBuf>,
    pub timestamp: String,
}

impl InspectionReport {
    pub fn new(
        outcome: &InspectionOutcome,
        result_jpeg: &[u8],
        result_path: Option<PathBuf>,
        timestamp: impl Into<String>,
    ) -> Self {
        let batch = &outcome.batch;
        InspectionReport {
            success: true,
            safety_status: batch.status(),
            safety_message: outcome.message.clone(),
            violations_count: batch.violations().len(),
            total_detections: batch.detections().len(),
            detections: batch.detections().iter().map(DetectionReport::from).collect(),
            violations: batch.violations().iter().map(DetectionReport::from).collect(),
            image_dimensions: batch.image_dimensions(),
            result_image: STANDARD.encode(result_jpeg),
            result_path,
            timestamp: timestamp.into(),
        }
    }
}

/// The JSON body returned when a request is refused or fails.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorReport {
    pub success: bool,
    pub error: String,
}

impl ErrorReport {
    pub fn new(error: impl ToString) -> Self {
        ErrorReport {
            success: false,
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;
    use crate::inspection::classifier::classify;
    use crate::inspection::message::summarize;
    use crate::object_detection::object_detection_model::RawDetection;
    use image::RgbImage;
    use serde_json::json;

    #[test]
    fn report_carries_the_response_fields() {
        let rows = vec![
            RawDetection {
                class_index: 2,
                confidence: 0.8149,
                bbox: BoundingBox::new(10.2, 9.7, 50.4, 60.0).unwrap(),
            },
            RawDetection {
                class_index: 5,
                confidence: 0.66,
                bbox: BoundingBox::new(5.0, 5.0, 90.0, 120.0).unwrap(),
            },
        ];
        let batch = classify(&rows, 0.3, (600, 1020));
        let outcome = InspectionOutcome {
            message: summarize(&batch),
            batch,
            annotated: RgbImage::new(1020, 600),
        };
        let report = InspectionReport::new(&outcome, b"jpeg", None, "20240101_120000");
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["safety_status"], json!("VIOLATION DETECTED"));
        assert_eq!(
            value["safety_message"],
            json!("SAFETY VIOLATION: Hard hat not detected. Please wear a hard hat.")
        );
        assert_eq!(value["violations_count"], json!(1));
        assert_eq!(value["total_detections"], json!(2));
        assert_eq!(
            value["violations"],
            json!([{"class_name": "NO-Hardhat", "confidence": 0.81, "bbox": [10, 10, 50, 60]}])
        );
        assert_eq!(value["detections"][1]["class_name"], json!("Person"));
        assert_eq!(value["image_dimensions"], json!([600, 1020]));
        assert_eq!(value["result_image"], json!("anBlZw=="));
        assert_eq!(value["timestamp"], json!("20240101_120000"));
        assert!(value.get("result_path").is_none());
    }

    #[test]
    fn error_report_shape() {
        assert_eq!(
            serde_json::to_value(ErrorReport::new("No file selected")).unwrap(),
            json!({"success": false, "error": "No file selected"})
        );
    }
}
