use crate::audio::queue::Announcer;
use crate::error::PipelineError;
use crate::inspection::batch::DetectionBatch;
use crate::inspection::classifier::{DEFAULT_CONFIDENCE_THRESHOLD, classify};
use crate::inspection::message::{SafetyMessage, summarize};
use crate::inspection::renderer::{RenderStyle, render};
use crate::object_detection::detection_adapter::{
    CANONICAL_HEIGHT, CANONICAL_WIDTH, DetectionAdapter,
};
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use image::{DynamicImage, RgbImage};
use std::sync::Arc;

/// Knobs of the inspection pipeline that are policy rather than model properties.
#[derive(Clone, Debug)]
pub struct PipelineSettings {
    pub canonical_width: u32,
    pub canonical_height: u32,
    pub confidence_threshold: f32,
    pub style: RenderStyle,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            canonical_width: CANONICAL_WIDTH,
            canonical_height: CANONICAL_HEIGHT,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            style: RenderStyle::default(),
        }
    }
}

/// Result of inspecting one image. Owned exclusively by the request that produced it.
#[derive(Clone, Debug)]
pub struct InspectionOutcome {
    pub batch: DetectionBatch,
    /// Annotated copy of the canonical-resolution input.
    pub annotated: RgbImage,
    pub message: SafetyMessage,
}

/// Sequences detection, classification, rendering and messaging for one image at a time.
///
/// The detector is injected and only read; the pipeline holds no per-request state, so one
/// instance can serve any number of requests.
pub struct Pipeline<M> {
    adapter: DetectionAdapter<M>,
    confidence_threshold: f32,
    style: RenderStyle,
    announcer: Option<Arc<dyn Announcer>>,
}

impl<M: ObjectDetectionModel> Pipeline<M> {
    pub fn new(model: M, settings: PipelineSettings) -> Self {
        Pipeline {
            adapter: DetectionAdapter::new(
                model,
                settings.canonical_width,
                settings.canonical_height,
            ),
            confidence_threshold: settings.confidence_threshold,
            style: settings.style,
            announcer: None,
        }
    }

    /// Successful requests that ask for audio hand their message to `announcer`.
    pub fn with_announcer(mut self, announcer: Arc<dyn Announcer>) -> Self {
        self.announcer = Some(announcer);
        self
    }

    /// Inspects encoded image bytes and announces the message. A decode failure aborts before
    /// the detector runs.
    pub fn process(&self, image_bytes: &[u8]) -> Result<InspectionOutcome, PipelineError> {
        self.inspect(image_bytes, true)
    }

    /// Like [`Pipeline::process`], with the caller deciding whether the message is announced.
    pub fn inspect(
        &self,
        image_bytes: &[u8],
        announce: bool,
    ) -> Result<InspectionOutcome, PipelineError> {
        let canonical = self.adapter.normalize_bytes(image_bytes)?;
        self.process_canonical(canonical, announce)
    }

    pub fn process_image(&self, image: &DynamicImage) -> Result<InspectionOutcome, PipelineError> {
        self.process_canonical(self.adapter.normalize(image), true)
    }

    fn process_canonical(
        &self,
        canonical: RgbImage,
        announce: bool,
    ) -> Result<InspectionOutcome, PipelineError> {
        let rows = self.adapter.detect(&canonical)?;
        let (width, height) = canonical.dimensions();
        let batch = classify(&rows, self.confidence_threshold, (height, width));
        let annotated = render(&canonical, &batch, &self.style);
        let message = summarize(&batch);
        log::info!(
            "inspected image: {} raw rows, {} detections, {} violations, status {}",
            rows.len(),
            batch.detections().len(),
            batch.violations().len(),
            batch.status()
        );
        if let Some(announcer) = self.announcer.as_ref().filter(|_| announce) {
            announcer.announce(&message);
        }
        Ok(InspectionOutcome {
            batch,
            annotated,
            message,
        })
    }
}
