//! Churn Inference Engine
//!
//! Loads the model artifact, scores aligned feature vectors and ties the
//! aligner, scaler and classifier together in an immutable
//! [`PredictionContext`].

mod artifact;
mod context;
mod engine;
#[cfg(feature = "onnx")]
mod onnx;
mod scorer;

pub use artifact::{ArtifactMetadata, ModelArtifact, ModelSpec, DEFAULT_ARTIFACT_PATH};
pub use context::PredictionContext;
pub use engine::{ChurnPrediction, InferenceEngine, InferenceResult, RiskLabel};
#[cfg(feature = "onnx")]
pub use onnx::OnnxScorer;
pub use scorer::{DecisionTree, LogisticRegression, RandomForest, Scorer};

use feature_engine::{AlignError, ScalingError, SchemaError};
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected} features, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

/// Errors loading the model artifact; all of them are fatal to the session
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Could not find {0} in the current folder")]
    NotFound(String),
    #[error("Could not read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed model artifact: {0}")]
    Malformed(String),
    #[error("Model artifact is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("Model artifact has an invalid feature schema: {0}")]
    InvalidSchema(#[from] SchemaError),
    #[error("Model artifact has an invalid scaler: {0}")]
    InvalidScaler(#[from] ScalingError),
    #[error("Model artifact has an invalid classifier: {0}")]
    InvalidModel(#[from] InferenceError),
}

/// Errors for a single prediction request; the session stays usable
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("{0}")]
    Alignment(#[from] AlignError),
    #[error("{0}")]
    Inference(#[from] InferenceError),
}

impl PredictionError {
    /// True when the record and the schema disagree
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, PredictionError::Alignment(e) if e.is_schema_mismatch())
    }
}
