//! Model Artifact Loading
//!
//! The artifact is a single JSON bundle holding the fitted classifier, the
//! fitted scaler and the training column layout.

use crate::{ArtifactError, InferenceEngine, LogisticRegression, RandomForest};
use feature_engine::FittedScaler;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Conventional artifact file name, resolved against the working directory
pub const DEFAULT_ARTIFACT_PATH: &str = "churn_model_artifacts.json";

/// Classifier carried by the artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    /// ONNX file, relative to the artifact's directory
    #[cfg(feature = "onnx")]
    Onnx { path: PathBuf },
}

impl ModelSpec {
    /// Validate the classifier and wrap it in an engine
    pub fn into_engine(self, base_dir: &Path, n_features: usize) -> Result<InferenceEngine, ArtifactError> {
        #[cfg(not(feature = "onnx"))]
        let _ = (base_dir, n_features);

        match self {
            ModelSpec::LogisticRegression(model) => Ok(InferenceEngine::new(Box::new(model))),
            ModelSpec::RandomForest(model) => {
                model.validate()?;
                Ok(InferenceEngine::new(Box::new(model)))
            }
            #[cfg(feature = "onnx")]
            ModelSpec::Onnx { path } => {
                let scorer = crate::OnnxScorer::load(&base_dir.join(path), n_features)?;
                Ok(InferenceEngine::new(Box::new(scorer)))
            }
        }
    }
}

/// Optional descriptive fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Shown as a caption under each prediction
    pub description: Option<String>,
    /// Version tag of the training run
    pub version: Option<String>,
}

/// Every field optional so absence can be reported by name
#[derive(Deserialize)]
struct RawArtifact {
    model: Option<Value>,
    scaler: Option<Value>,
    feature_columns: Option<Value>,
    num_cols: Option<Value>,
    categorical_cols: Option<Value>,
    categorical_levels: Option<BTreeMap<String, Vec<String>>>,
    metadata: Option<ArtifactMetadata>,
}

fn required<T: DeserializeOwned>(value: Option<Value>, field: &'static str) -> Result<T, ArtifactError> {
    let value = value.ok_or(ArtifactError::MissingField(field))?;
    serde_json::from_value(value).map_err(|e| ArtifactError::Malformed(format!("{field}: {e}")))
}

/// Deserialized model artifact
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub model: ModelSpec,
    pub scaler: FittedScaler,
    /// Ordered training columns
    pub feature_columns: Vec<String>,
    /// Columns the scaler was fitted on
    pub num_cols: Vec<String>,
    /// Attributes that were one-hot encoded
    pub categorical_cols: Vec<String>,
    /// Level enumerations; the form's enumerations are used when absent
    pub categorical_levels: Option<BTreeMap<String, Vec<String>>>,
    pub metadata: ArtifactMetadata,
    /// Directory relative model files resolve against
    pub base_dir: PathBuf,
}

impl ModelArtifact {
    /// Read and parse the artifact file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ArtifactError::NotFound(path.display().to_string()),
            _ => ArtifactError::Unreadable {
                path: path.display().to_string(),
                source: e,
            },
        })?;

        let mut artifact = Self::from_json_str(&json)?;
        artifact.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        info!(
            "Loaded model artifact {} ({} feature columns)",
            path.display(),
            artifact.feature_columns.len()
        );
        Ok(artifact)
    }

    /// Parse an artifact from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ArtifactError> {
        let raw: RawArtifact =
            serde_json::from_str(json).map_err(|e| ArtifactError::Malformed(e.to_string()))?;

        Ok(Self {
            model: required(raw.model, "model")?,
            scaler: required(raw.scaler, "scaler")?,
            feature_columns: required(raw.feature_columns, "feature_columns")?,
            num_cols: required(raw.num_cols, "num_cols")?,
            categorical_cols: required(raw.categorical_cols, "categorical_cols")?,
            categorical_levels: raw.categorical_levels,
            metadata: raw.metadata.unwrap_or_default(),
            base_dir: PathBuf::new(),
        })
    }
}
