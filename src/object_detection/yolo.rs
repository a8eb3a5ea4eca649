use crate::annotations::bounding_box::BoundingBox;
use crate::error::InferenceError;
use crate::image_utils::image_conversion::convert_rgb_image_to_owned_array;
use crate::object_detection::object_detection_model::{ObjectDetectionModel, RawDetection};
use crate::object_detection::object_detection_utils::non_maximum_suppression;
use crate::object_detection::ort_inference_session::OrtInferenceSession;
use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::{ArrayView2, Axis, Ix3};
use std::path::Path;

pub const DEFAULT_INPUT_SIZE: u32 = 640;
/// Pre-filter applied inside the detector, below the classifier's policy threshold.
pub const DEFAULT_DETECTOR_CONFIDENCE: f32 = 0.25;
pub const DEFAULT_NMS_IOU: f32 = 0.7;

/// An ultralytics YOLO detection head exported to ONNX.
///
/// The export emits a `[1, 4 + classes, predictions]` tensor with centre/size box encoding and
/// one score per class. This wrapper stretches the canonical image onto the model's input grid,
/// maps boxes back, and runs class-aware NMS, which is the only deduplication in the system.
pub struct YoloDetector {
    ort_session: OrtInferenceSession,
    input_width: u32,
    input_height: u32,
    confidence: f32,
    iou_threshold: f32,
}

impl YoloDetector {
    pub fn new(model_path: &Path, input_width: u32, input_height: u32) -> ort::Result<Self> {
        let ort_session = OrtInferenceSession::new(model_path)?;
        log::info!(
            "loaded detector {} ({}x{} input)",
            model_path.display(),
            input_width,
            input_height
        );
        Ok(YoloDetector {
            ort_session,
            input_width,
            input_height,
            confidence: DEFAULT_DETECTOR_CONFIDENCE,
            iou_threshold: DEFAULT_NMS_IOU,
        })
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }
}

impl ObjectDetectionModel for YoloDetector {
    fn infer(&self, image: &RgbImage) -> Result<Vec<RawDetection>, InferenceError> {
        let (width, height) = image.dimensions();
        let resized = imageops::resize(
            image,
            self.input_width,
            self.input_height,
            FilterType::Triangle,
        );
        let input = convert_rgb_image_to_owned_array(&resized);
        let output = self.ort_session.run(&input)?;
        let shape = output.shape().to_vec();
        let output = output
            .into_dimensionality::<Ix3>()
            .map_err(|_| InferenceError::OutputShape(shape.clone()))?;
        if output.shape()[0] != 1 || output.shape()[1] < 5 {
            return Err(InferenceError::OutputShape(shape));
        }
        let predictions = output.index_axis(Axis(0), 0);
        let detections = decode_predictions(
            predictions.t(),
            self.confidence,
            width as f32 / self.input_width as f32,
            height as f32 / self.input_height as f32,
            (width as f32, height as f32),
        );
        Ok(non_maximum_suppression(detections, self.iou_threshold))
    }
}

/// Turns `(predictions, 4 + classes)` rows into detections in canvas coordinates.
fn decode_predictions(
    rows: ArrayView2<f32>,
    confidence: f32,
    scale_x: f32,
    scale_y: f32,
    canvas: (f32, f32),
) -> Vec<RawDetection> {
    let mut detections = Vec::new();
    for row in rows.axis_iter(Axis(0)) {
        let best = row
            .iter()
            .skip(4) // skips bounding box coords.
            .copied()
            .enumerate()
            .reduce(|accum, next| if next.1 > accum.1 { next } else { accum });
        let Some((class_index, prob)) = best else {
            continue;
        };
        if prob < confidence {
            continue;
        }
        let bbox = BoundingBox::from_center(row[0], row[1], row[2], row[3])
            .scaled(scale_x, scale_y)
            .clamped(canvas.0, canvas.1);
        detections.push(RawDetection {
            class_index,
            confidence: prob,
            bbox,
        });
    }
    detections
}
