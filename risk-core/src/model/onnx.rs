//! ONNX Runtime backend
//!
//! For forests exported with skl2onnx (`zipmap` disabled): input is a
//! `[1, 31]` float tensor, the `probabilities` output is `[1, 3]` in the
//! sorted class order Dropout, Enrolled, Graduate.

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use crate::error::InferenceError;
use crate::features::FEATURE_COUNT;
use crate::prediction::ClassDistribution;
use super::inference::{Classifier, ModelBackend, ModelMetadata};

const PROBABILITY_OUTPUT: &str = "probabilities";

pub struct OnnxForest {
    /// `Session::run` needs `&mut`, so calls are serialised
    session: Mutex<Session>,
    output_name: String,
    metadata: ModelMetadata,
}

impl OnnxForest {
    pub fn from_bytes(model_bytes: &[u8], source: impl Into<String>) -> Result<Self, InferenceError> {
        log::info!("Loading ONNX model from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| InferenceError::Runtime(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Runtime(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| InferenceError::Format(format!("Load from memory error: {}", e)))?;

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == PROBABILITY_OUTPUT)
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::Format("No output defined".to_string()))?;

        let metadata = ModelMetadata::new(source, ModelBackend::Onnx, None, model_bytes);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            metadata,
        })
    }
}

impl Classifier for OnnxForest {
    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<ClassDistribution, InferenceError> {
        let row: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let input = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), row)
            .map_err(|e| InferenceError::Runtime(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input)
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| InferenceError::Runtime("No output".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Runtime(format!("Extract error: {}", e)))?;

        if data.len() != 3 {
            return Err(InferenceError::Runtime(format!(
                "expected 3 probabilities, got {}",
                data.len()
            )));
        }

        Ok(ClassDistribution([data[0] as f64, data[1] as f64, data[2] as f64]))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
