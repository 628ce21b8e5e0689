//! Inference Engine Implementation

use crate::{InferenceError, Scorer};
use feature_engine::FeatureVector;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Binary churn-risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    /// Predicted to stay
    LowRisk,
    /// Predicted to churn
    HighRisk,
}

impl RiskLabel {
    /// Map a predicted class to its label
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            RiskLabel::HighRisk
        } else {
            RiskLabel::LowRisk
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::LowRisk => "low_risk",
            RiskLabel::HighRisk => "high_risk",
        }
    }
}

/// Prediction result from inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnPrediction {
    /// Risk label derived from the predicted class
    pub label: RiskLabel,
    /// Predicted class (1 = churn)
    pub predicted_class: u8,
    /// Probability of churn (0.0 to 1.0)
    pub churn_probability: f64,
    /// Timestamp when prediction was made
    pub timestamp_ms: u64,
}

impl ChurnPrediction {
    /// Churn probability as a percentage with two decimals, e.g. `73.21%`
    pub fn probability_percent(&self) -> String {
        format!("{:.2}%", self.churn_probability * 100.0)
    }

    /// One-line verdict shown to the user
    pub fn headline(&self) -> String {
        match self.label {
            RiskLabel::HighRisk => format!(
                "High Risk of Churn (Probability: {})",
                self.probability_percent()
            ),
            RiskLabel::LowRisk => format!(
                "Low Risk of Churn (Probability of Churn: {})",
                self.probability_percent()
            ),
        }
    }
}

/// Result of inference operation
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// The prediction
    pub prediction: ChurnPrediction,
    /// Time spent aligning and scoring
    pub latency: Duration,
    /// Attributes whose unknown level was encoded as all zeros
    pub zero_filled: Vec<String>,
}

/// Scores aligned feature vectors with a loaded classifier
pub struct InferenceEngine {
    scorer: Box<dyn Scorer>,
}

impl InferenceEngine {
    /// Create a new inference engine around a loaded classifier
    pub fn new(scorer: Box<dyn Scorer>) -> Self {
        info!(
            "Creating inference engine: {} over {} features",
            scorer.name(),
            scorer.n_features()
        );
        Self { scorer }
    }

    /// Run inference on an aligned feature vector
    pub fn predict(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        let start = Instant::now();

        if features.len() != self.scorer.n_features() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.scorer.n_features(),
                actual: features.len(),
            });
        }

        let churn_probability = self.scorer.predict_proba(features.values())?;
        if !(0.0..=1.0).contains(&churn_probability) {
            return Err(InferenceError::InferenceFailed(format!(
                "classifier returned probability {churn_probability}"
            )));
        }
        let predicted_class = self.scorer.predict(features.values())?;

        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let latency = start.elapsed();
        debug!("Inference completed in {:?}", latency);

        Ok(InferenceResult {
            prediction: ChurnPrediction {
                label: RiskLabel::from_class(predicted_class),
                predicted_class,
                churn_probability,
                timestamp_ms,
            },
            latency,
            zero_filled: features.zero_filled().to_vec(),
        })
    }

    /// Width the classifier expects
    pub fn n_features(&self) -> usize {
        self.scorer.n_features()
    }

    /// Classifier name
    pub fn model_name(&self) -> &'static str {
        self.scorer.name()
    }
}
