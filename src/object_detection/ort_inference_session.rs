use crate::error::InferenceError;
use ndarray::{Array4, ArrayD};
use ort::inputs;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use std::sync::Mutex;

/// An onnxruntime inference session.
///
/// The detector is just a wrapper around an ONNX inference session that handles running the
/// model on hardware. `Session::run` needs exclusive access, so the session sits behind a mutex
/// and concurrent requests take turns.
pub struct OrtInferenceSession {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OrtInferenceSession {
    pub fn new(model_path: &Path) -> ort::Result<Self> {
        let session = Session::builder()?.commit_from_file(model_path)?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .unwrap_or_else(|| "output0".to_string());
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    /// Runs the model on a single `(1, 3, H, W)` tensor and copies out its first output.
    pub fn run(&self, input: &Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::SessionPoisoned)?;
        let outputs = session.run(inputs![
            self.input_name.as_str() => TensorRef::from_array_view(input)?
        ])?;
        let output = outputs[self.output_name.as_str()].try_extract_array::<f32>()?;
        Ok(output.to_owned())
    }
}
