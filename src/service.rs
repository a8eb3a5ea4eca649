use crate::error::{PipelineError, UploadError};
use crate::inspection::pipeline::Pipeline;
use crate::inspection::report::{ErrorReport, InspectionReport};
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::storage::{ResultStore, request_timestamp};
use crate::upload::UploadPolicy;
use thiserror::Error;

/// Why a single upload produced no report.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Rejected(#[from] UploadError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl RequestError {
    /// Whether the client is at fault (bad upload or unreadable image).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RequestError::Rejected(_) | RequestError::Pipeline(PipelineError::Decode(_))
        )
    }

    pub fn to_report(&self) -> ErrorReport {
        ErrorReport::new(self)
    }
}

/// Front-end glue around the pipeline: validates an upload, inspects it, and publishes the
/// annotated result.
///
/// Storage is best effort. A failed write is logged and the report is still returned, with the
/// annotated image inline and no `result_path`.
pub struct InspectionService<M> {
    pipeline: Pipeline<M>,
    store: ResultStore,
    policy: UploadPolicy,
}

impl<M: ObjectDetectionModel> InspectionService<M> {
    pub fn new(pipeline: Pipeline<M>, store: ResultStore, policy: UploadPolicy) -> Self {
        InspectionService {
            pipeline,
            store,
            policy,
        }
    }

    /// Inspects one upload. `announce` is the request's own audio choice; it only has an effect
    /// when the pipeline was built with an announcer.
    pub fn handle_upload(
        &self,
        filename: &str,
        bytes: &[u8],
        announce: bool,
    ) -> Result<InspectionReport, RequestError> {
        self.policy.validate(filename, bytes.len())?;
        let timestamp = request_timestamp();
        if let Err(err) = self.store.save_upload(filename, bytes, &timestamp) {
            log::warn!("could not keep a copy of upload {filename}: {err}");
        }

        let outcome = self.pipeline.inspect(bytes, announce)?;

        let (jpeg, result_path) = match self.store.encode_result(&outcome.annotated) {
            Ok(jpeg) => {
                let path = match self.store.save_result(&jpeg, &timestamp) {
                    Ok(path) => Some(path),
                    Err(err) => {
                        log::warn!("could not save annotated result: {err}");
                        None
                    }
                };
                (jpeg, path)
            }
            Err(err) => {
                log::warn!("could not encode annotated result: {err}");
                (Vec::new(), None)
            }
        };
        Ok(InspectionReport::new(&outcome, &jpeg, result_path, timestamp))
    }
}
