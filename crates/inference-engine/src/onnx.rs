//! ONNX Classifier via tract

use crate::{InferenceError, Scorer};
use std::path::Path;
use tracing::info;
use tract_onnx::prelude::*;

/// Classifier exported to ONNX without the ZipMap post-processor, so its
/// second output is a `[1, 2]` probability tensor.
pub struct OnnxScorer {
    model: TypedRunnableModel<TypedModel>,
    n_features: usize,
}

impl OnnxScorer {
    /// Load and optimize an ONNX model for rows of `n_features` columns
    pub fn load(path: &Path, n_features: usize) -> Result<Self, InferenceError> {
        info!("Loading ONNX classifier from {}", path.display());
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.with_input_fact(0, f32::fact([1, n_features]).into()))
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;

        Ok(Self { model, n_features })
    }
}

impl Scorer for OnnxScorer {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.n_features {
            return Err(InferenceError::InvalidInputShape {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let row: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.n_features), row)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .into();

        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let probabilities = outputs
            .get(1)
            .ok_or_else(|| InferenceError::InferenceFailed("model has no probability output".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        probabilities
            .iter()
            .nth(1)
            .map(|&p| f64::from(p))
            .ok_or_else(|| InferenceError::InferenceFailed("probability output has fewer than 2 classes".to_string()))
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}
