use crate::error::PipelineError;
use crate::image_utils::image_io::{decode_image, resize_to_canonical};
use crate::object_detection::object_detection_model::{ObjectDetectionModel, RawDetection};
use image::{DynamicImage, RgbImage};

pub const CANONICAL_WIDTH: u32 = 1020;
pub const CANONICAL_HEIGHT: u32 = 600;

/// Thin seam between the pipeline and the detector collaborator.
///
/// Owns the canonical-resolution policy: every image is decoded and resized here before the
/// model sees it, so all downstream coordinates live on one `width` x `height` grid.
pub struct DetectionAdapter<M> {
    model: M,
    width: u32,
    height: u32,
}

impl<M: ObjectDetectionModel> DetectionAdapter<M> {
    pub fn new(model: M, width: u32, height: u32) -> Self {
        DetectionAdapter { model, width, height }
    }

    pub fn canonical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Decodes raw upload bytes onto the canonical grid.
    pub fn normalize_bytes(&self, bytes: &[u8]) -> Result<RgbImage, PipelineError> {
        let image = decode_image(bytes).map_err(PipelineError::Decode)?;
        Ok(self.normalize(&image))
    }

    pub fn normalize(&self, image: &DynamicImage) -> RgbImage {
        resize_to_canonical(image, self.width, self.height)
    }

    /// Runs the detector on an already-normalized image.
    pub fn detect(&self, canonical: &RgbImage) -> Result<Vec<RawDetection>, PipelineError> {
        Ok(self.model.infer(canonical)?)
    }
}
