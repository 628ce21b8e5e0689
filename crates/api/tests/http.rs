use api::{create_router, AppState, ModelStatus, ServerConfig, SharedState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use data_validator::Validator;
use feature_engine::{Contract, CustomerRecord, UnknownLevelPolicy};
use inference_engine::{PredictionContext, DEFAULT_ARTIFACT_PATH};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn ready_app() -> Router {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(DEFAULT_ARTIFACT_PATH);
    let context = PredictionContext::load(path, UnknownLevelPolicy::Reject).expect("artifact");
    app(ModelStatus::Ready(context))
}

fn app(model: ModelStatus) -> Router {
    let state: SharedState = Arc::new(AppState::new(model, Validator::default()));
    create_router(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn post_form(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Tenure 1, fiber, no security or support, month-to-month, as submitted by the browser
const AT_RISK_FORM: &str = "gender=Male&SeniorCitizen=0&Partner=Yes&Dependents=Yes&tenure=1\
&PhoneService=Yes&MultipleLines=No&InternetService=Fiber+optic&OnlineSecurity=No\
&OnlineBackup=Yes&DeviceProtection=Yes&TechSupport=No&StreamingTV=Yes&StreamingMovies=Yes\
&Contract=Month-to-month&PaperlessBilling=Yes&PaymentMethod=Electronic+check\
&MonthlyCharges=70&TotalCharges=1500";

#[tokio::test]
async fn form_page_renders_defaults() {
    let (status, html) = send(ready_app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Model loaded successfully and ready to predict."));
    assert!(html.contains(r#"<option value="Month-to-month" selected>"#));
    assert!(html.contains("Predict Churn"));
}

#[tokio::test]
async fn form_submission_shows_verdict_and_caption() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(AT_RISK_FORM))
        .unwrap();

    let (status, html) = send(ready_app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("High Risk of Churn (Probability: 70.00%)"));
    assert!(html.contains(
        "Model: Random Forest trained with SMOTE and full preprocessing pipeline."
    ));
    // Submitted values stay selected for the next attempt
    assert!(html.contains(r#"<option value="Fiber optic" selected>"#));
}

#[tokio::test]
async fn json_prediction_for_committed_customer() {
    let record = CustomerRecord {
        contract: Contract::TwoYear,
        ..Default::default()
    };
    let body = serde_json::to_value(record).unwrap();

    let (status, text) = send(ready_app(), post_json("/api/v1/predict", &body)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["label"], "low_risk");
    assert_eq!(json["predicted_class"], 0);
    assert_eq!(json["model"], "random forest");
    assert!(json["headline"]
        .as_str()
        .unwrap()
        .starts_with("Low Risk of Churn (Probability of Churn: "));
}

#[tokio::test]
async fn out_of_range_record_is_rejected() {
    let mut body = serde_json::to_value(CustomerRecord::default()).unwrap();
    body["tenure"] = Value::from(100);
    body["MonthlyCharges"] = Value::from(-5.0);

    let (status, text) = send(ready_app(), post_json("/api/v1/predict", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["error"], "validation");
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("tenure"));
    assert!(message.contains("MonthlyCharges"));
}

#[tokio::test]
async fn unknown_level_is_a_schema_mismatch() {
    let mut body = serde_json::to_value(CustomerRecord::default()).unwrap();
    body["Contract"] = Value::from("Too year");

    let (status, text) = send(ready_app(), post_json("/api/v1/predict/raw", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["error"], "schema_mismatch");
    assert!(json["message"].as_str().unwrap().contains("Too year"));
}

#[tokio::test]
async fn raw_record_matches_typed_prediction() {
    let body = serde_json::to_value(CustomerRecord::default()).unwrap();

    let (_, typed) = send(ready_app(), post_json("/api/v1/predict", &body)).await;
    let (status, raw) = send(ready_app(), post_json("/api/v1/predict/raw", &body)).await;
    assert_eq!(status, StatusCode::OK);

    let typed: Value = serde_json::from_str(&typed).unwrap();
    let raw: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(typed["churn_probability"], raw["churn_probability"]);
    assert_eq!(raw["zero_filled"], Value::Array(vec![]));
}

#[tokio::test]
async fn schema_lists_training_columns() {
    let (status, text) = send(ready_app(), get("/api/v1/schema")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["columns"].as_array().unwrap().len(), 30);
    assert_eq!(json["numeric_columns"][0], "tenure");
    assert_eq!(json["unknown_level_policy"], "reject");
}

#[tokio::test]
async fn unavailable_model_blocks_predictions() {
    let reason = format!("Could not find {DEFAULT_ARTIFACT_PATH} in the current folder");

    let (status, html) = send(app(ModelStatus::Unavailable(reason.clone())), get("/")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(html.contains(&reason));
    assert!(!html.contains("<form"));

    let body = serde_json::to_value(CustomerRecord::default()).unwrap();
    let (status, text) = send(
        app(ModelStatus::Unavailable(reason.clone())),
        post_json("/api/v1/predict", &body),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["error"], "unavailable");

    let (status, text) = send(app(ModelStatus::Unavailable(reason)), get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["status"], "unavailable");
    assert_eq!(json["model"]["loaded"], false);
}

#[tokio::test]
async fn health_reports_loaded_model() {
    let (status, text) = send(ready_app(), get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model"]["n_features"], 30);
}

#[tokio::test]
async fn form_range_error_keeps_the_form() {
    let body = AT_RISK_FORM.replace("tenure=1&", "tenure=-1&");
    let (status, html) = send(ready_app(), post_form(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("tenure value -1 is out of range [0, 72]"));
    assert!(html.contains("<form"));
    assert!(html.find(r#"id="result""#).unwrap() < html.find("<form").unwrap());
}

#[tokio::test]
async fn unparseable_form_field_keeps_the_form() {
    let body = AT_RISK_FORM.replace("tenure=1&", "tenure=soon&");
    let (status, html) = send(ready_app(), post_form(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("Failed to deserialize form body"));
    assert!(html.contains("<form"));
    assert!(html.contains("Predict Churn"));
}

#[tokio::test]
async fn negative_tenure_reported_with_other_json_violations() {
    let mut body = serde_json::to_value(CustomerRecord::default()).unwrap();
    body["tenure"] = Value::from(-1);
    body["MonthlyCharges"] = Value::from(-5.0);

    let (status, text) = send(ready_app(), post_json("/api/v1/predict", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["error"], "validation");
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("tenure value -1"));
    assert!(message.contains("MonthlyCharges value -5"));
}

#[tokio::test]
async fn undecodable_json_gets_a_json_error_body() {
    let mut body = serde_json::to_value(CustomerRecord::default()).unwrap();
    body["Contract"] = Value::from("Three year");

    let (status, text) = send(ready_app(), post_json("/api/v1/predict", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["error"], "validation");
    assert!(json["message"].as_str().unwrap().contains("Three year"));
}

#[tokio::test]
async fn raw_record_with_encoded_indicator_is_rejected() {
    let body = serde_json::json!({
        "Contract": "Two year",
        "Contract_One year": 1.0,
    });
    let mut record = serde_json::to_value(CustomerRecord::default()).unwrap();
    record
        .as_object_mut()
        .unwrap()
        .extend(body.as_object().unwrap().clone());

    let (status, text) = send(ready_app(), post_json("/api/v1/predict/raw", &record)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["error"], "schema_mismatch");
    assert!(json["message"].as_str().unwrap().contains("Contract_One year"));
}

#[tokio::test]
async fn absent_artifact_leaves_service_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        artifact_path: dir.path().join(DEFAULT_ARTIFACT_PATH),
        ..Default::default()
    };

    let model = ModelStatus::load(&config);
    assert!(matches!(model, ModelStatus::Unavailable(_)));

    let (status, html) = send(app(model), get("/")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(html.contains("Could not find"));
    assert!(!html.contains("<form"));
}
