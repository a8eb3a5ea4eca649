use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::error::InferenceError;
use image::RgbImage;
use std::sync::Arc;

/// One unfiltered detector output row.
///
/// `class_index` is whatever the model emitted; it is only resolved against the taxonomy by the
/// violation classifier. The box is in the coordinate space of the image handed to the model.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDetection {
    pub class_index: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl BoundingBoxGeometry for RawDetection {
    fn left(&self) -> f32 {
        self.bbox.left()
    }

    fn top(&self) -> f32 {
        self.bbox.top()
    }

    fn right(&self) -> f32 {
        self.bbox.right()
    }

    fn bottom(&self) -> f32 {
        self.bbox.bottom()
    }
}

/// Defines a trait that all object detection models must follow.
///
/// Implementations take an image already normalized to the canonical working resolution and
/// return boxes in that image's pixel coordinates. An empty result is a valid answer. Inference
/// must be callable repeatedly from `&self`; models that need exclusive access to their runtime
/// serialize internally.
pub trait ObjectDetectionModel: Send + Sync {
    fn infer(&self, image: &RgbImage) -> Result<Vec<RawDetection>, InferenceError>;
}

impl<T: ObjectDetectionModel + ?Sized> ObjectDetectionModel for Arc<T> {
    fn infer(&self, image: &RgbImage) -> Result<Vec<RawDetection>, InferenceError> {
        (**self).infer(image)
    }
}

impl<T: ObjectDetectionModel + ?Sized> ObjectDetectionModel for Box<T> {
    fn infer(&self, image: &RgbImage) -> Result<Vec<RawDetection>, InferenceError> {
        (**self).infer(image)
    }
}
