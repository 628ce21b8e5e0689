//! Immutable Prediction Context

use crate::{
    ArtifactError, ArtifactMetadata, InferenceEngine, InferenceResult, ModelArtifact,
    PredictionError,
};
use feature_engine::{
    AlignError, CustomerRecord, FeatureAligner, FeatureSchema, FeatureVector, FittedScaler,
    RawRecord, Transformer, UnknownLevelPolicy,
};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything loaded from the artifact, built once and shared read-only
pub struct PredictionContext {
    schema: FeatureSchema,
    scaler: FittedScaler,
    aligner: FeatureAligner,
    engine: InferenceEngine,
    metadata: ArtifactMetadata,
}

impl PredictionContext {
    /// Load the artifact at `path` and build the context
    pub fn load(path: impl AsRef<Path>, policy: UnknownLevelPolicy) -> Result<Self, ArtifactError> {
        Self::from_artifact(ModelArtifact::load(path)?, policy)
    }

    /// Build the context from an already parsed artifact
    pub fn from_artifact(
        artifact: ModelArtifact,
        policy: UnknownLevelPolicy,
    ) -> Result<Self, ArtifactError> {
        let levels = match artifact.categorical_levels {
            Some(levels) => levels,
            None => {
                debug!("Artifact has no level enumerations, using the form's");
                CustomerRecord::category_levels()
            }
        };

        let schema = FeatureSchema::new(
            artifact.feature_columns,
            artifact.num_cols,
            artifact.categorical_cols,
            levels,
        )?;
        artifact.scaler.validate()?;
        if artifact.scaler.n_features() != schema.numeric_columns().len() {
            // Surfaces per request as a scaling error
            warn!(
                "Scaler was fitted on {} columns but the schema scales {}",
                artifact.scaler.n_features(),
                schema.numeric_columns().len()
            );
        }

        let engine = artifact.model.into_engine(&artifact.base_dir, schema.len())?;
        if engine.n_features() != schema.len() {
            warn!(
                "Classifier expects {} features but the schema has {}",
                engine.n_features(),
                schema.len()
            );
        }

        info!(
            "Prediction context ready: {} over {} columns, unknown levels {:?}",
            engine.model_name(),
            schema.len(),
            policy
        );

        Ok(Self {
            schema,
            scaler: artifact.scaler,
            aligner: FeatureAligner::new(policy),
            engine,
            metadata: artifact.metadata,
        })
    }

    /// Align a raw record with the training schema
    pub fn align(&self, record: &RawRecord) -> Result<FeatureVector, AlignError> {
        self.aligner.align(record, &self.schema, &self.scaler)
    }

    /// Align and score a loosely-typed record
    pub fn predict_raw(&self, record: &RawRecord) -> Result<InferenceResult, PredictionError> {
        let start = Instant::now();
        let features = self.align(record)?;
        let mut result = self.engine.predict(&features)?;
        result.latency = start.elapsed();
        Ok(result)
    }

    /// Align and score a form submission
    pub fn predict(&self, record: &CustomerRecord) -> Result<InferenceResult, PredictionError> {
        self.predict_raw(&record.to_raw())
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    pub fn policy(&self) -> UnknownLevelPolicy {
        self.aligner.policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LogisticRegression, ModelSpec, RiskLabel};
    use feature_engine::{Contract, StandardScaler, CATEGORICAL_ATTRIBUTES};
    use std::path::PathBuf;

    /// Churn driven by month-to-month contracts and short tenure
    fn telco_artifact() -> ModelArtifact {
        let columns = CustomerRecord::reference_columns();
        let coefficients = columns
            .iter()
            .map(|c| match c.as_str() {
                "tenure" => -1.5,
                "Contract_One year" => -1.0,
                "Contract_Two year" => -2.5,
                "InternetService_Fiber optic" => 0.8,
                _ => 0.0,
            })
            .collect();

        ModelArtifact {
            model: ModelSpec::LogisticRegression(LogisticRegression {
                coefficients,
                intercept: 0.2,
            }),
            scaler: FittedScaler::Standard(
                StandardScaler::new(vec![32.37, 64.76, 2283.3], vec![24.56, 30.09, 2266.77])
                    .unwrap(),
            ),
            feature_columns: columns,
            num_cols: vec!["tenure".into(), "MonthlyCharges".into(), "TotalCharges".into()],
            categorical_cols: CATEGORICAL_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
            categorical_levels: None,
            metadata: ArtifactMetadata::default(),
            base_dir: PathBuf::new(),
        }
    }

    #[test]
    fn test_predicts_from_typed_record() {
        let context =
            PredictionContext::from_artifact(telco_artifact(), UnknownLevelPolicy::Reject).unwrap();

        let loyal = CustomerRecord {
            contract: Contract::TwoYear,
            tenure: 70.0,
            ..Default::default()
        };
        let result = context.predict(&loyal).unwrap();
        assert_eq!(result.prediction.label, RiskLabel::LowRisk);

        let fresh = CustomerRecord {
            tenure: 1.0,
            ..Default::default()
        };
        let result = context.predict(&fresh).unwrap();
        assert_eq!(result.prediction.label, RiskLabel::HighRisk);
    }

    #[test]
    fn test_unknown_level_is_a_schema_mismatch() {
        let context =
            PredictionContext::from_artifact(telco_artifact(), UnknownLevelPolicy::Reject).unwrap();
        let mut raw = CustomerRecord::default().to_raw();
        raw.insert("Contract", "Too year");

        let err = context.predict_raw(&raw).unwrap_err();
        assert!(err.is_schema_mismatch());
        assert!(err.to_string().contains("Too year"));
    }

    #[test]
    fn test_zero_fill_policy_still_predicts() {
        let context =
            PredictionContext::from_artifact(telco_artifact(), UnknownLevelPolicy::ZeroFill)
                .unwrap();
        let mut raw = CustomerRecord::default().to_raw();
        raw.insert("Contract", "Too year");
        assert!(context.predict_raw(&raw).is_ok());
    }

    #[test]
    fn test_scaler_width_mismatch_surfaces_per_request() {
        let mut artifact = telco_artifact();
        artifact.scaler =
            FittedScaler::Standard(StandardScaler::new(vec![0.0; 2], vec![1.0; 2]).unwrap());
        let context =
            PredictionContext::from_artifact(artifact, UnknownLevelPolicy::Reject).unwrap();

        let err = context.predict(&CustomerRecord::default()).unwrap_err();
        assert!(!err.is_schema_mismatch());
        assert!(matches!(err, PredictionError::Alignment(AlignError::Scaling(_))));
    }

    #[test]
    fn test_invalid_schema_is_fatal() {
        let mut artifact = telco_artifact();
        artifact.num_cols.push("Churn".into());
        assert!(matches!(
            PredictionContext::from_artifact(artifact, UnknownLevelPolicy::Reject),
            Err(ArtifactError::InvalidSchema(_))
        ));
    }
}
