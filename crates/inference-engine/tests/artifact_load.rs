use feature_engine::{
    Contract, CustomerRecord, InternetAddon, InternetService, UnknownLevelPolicy,
};
use inference_engine::{ArtifactError, PredictionContext, RiskLabel, DEFAULT_ARTIFACT_PATH};
use std::path::PathBuf;

fn shipped_artifact() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(DEFAULT_ARTIFACT_PATH)
}

#[test]
fn shipped_artifact_loads_and_predicts() {
    let context = PredictionContext::load(shipped_artifact(), UnknownLevelPolicy::Reject)
        .expect("shipped artifact");
    assert_eq!(context.schema().len(), CustomerRecord::reference_columns().len());
    assert_eq!(context.schema().columns(), CustomerRecord::reference_columns().as_slice());
    assert_eq!(
        context.metadata().description.as_deref(),
        Some("Random Forest trained with SMOTE and full preprocessing pipeline.")
    );

    let committed = CustomerRecord {
        contract: Contract::TwoYear,
        tenure: 12.0,
        monthly_charges: 70.0,
        total_charges: 1500.0,
        ..Default::default()
    };
    let result = context.predict(&committed).expect("prediction");
    assert_eq!(result.prediction.label, RiskLabel::LowRisk);

    let at_risk = CustomerRecord {
        tenure: 1.0,
        internet_service: InternetService::FiberOptic,
        online_security: InternetAddon::No,
        tech_support: InternetAddon::No,
        ..Default::default()
    };
    let result = context.predict(&at_risk).expect("prediction");
    assert_eq!(result.prediction.label, RiskLabel::HighRisk);
    assert_eq!(result.prediction.probability_percent(), "70.00%");
}

#[test]
fn missing_artifact_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_ARTIFACT_PATH);

    let err = PredictionContext::load(&path, UnknownLevelPolicy::Reject)
        .err()
        .expect("load must fail");
    assert!(matches!(err, ArtifactError::NotFound(_)));
    assert!(err.to_string().starts_with("Could not find"));
}

#[test]
fn incomplete_artifact_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_ARTIFACT_PATH);
    std::fs::write(
        &path,
        r#"{"model": {"kind": "logistic_regression", "coefficients": [1.0], "intercept": 0.0},
            "feature_columns": ["tenure"], "num_cols": ["tenure"], "categorical_cols": []}"#,
    )
    .unwrap();

    let err = PredictionContext::load(&path, UnknownLevelPolicy::Reject)
        .err()
        .expect("load must fail");
    assert!(matches!(err, ArtifactError::MissingField("scaler")));
}

#[test]
fn unreadable_artifact_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be read as a file
    let err = PredictionContext::load(dir.path(), UnknownLevelPolicy::Reject)
        .err()
        .expect("load must fail");
    assert!(matches!(
        err,
        ArtifactError::Unreadable { .. } | ArtifactError::Malformed(_)
    ));
}

#[test]
fn corrupt_forest_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_ARTIFACT_PATH);
    std::fs::write(
        &path,
        r#"{"model": {"kind": "random_forest", "n_features": 1, "trees": [{
                "children_left": [0], "children_right": [0], "feature": [0],
                "threshold": [0.5], "value": [[1.0, 1.0]]}]},
            "scaler": {"kind": "standard", "mean": [0.0], "scale": [1.0]},
            "feature_columns": ["tenure"], "num_cols": ["tenure"], "categorical_cols": []}"#,
    )
    .unwrap();

    let err = PredictionContext::load(&path, UnknownLevelPolicy::Reject)
        .err()
        .expect("load must fail");
    assert!(matches!(err, ArtifactError::InvalidModel(_)));
}
