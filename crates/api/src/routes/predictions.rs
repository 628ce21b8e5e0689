//! Prediction Routes

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::StatusCode,
    response::Html,
    Form, Json,
};
use feature_engine::{CustomerRecord, RawRecord};
use inference_engine::{InferenceResult, RiskLabel};
use serde::Serialize;
use tracing::{debug, warn};

use crate::form::{self, Outcome};
use crate::{ApiError, ModelStatus, SharedState};

/// Response for the prediction endpoints
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub label: RiskLabel,
    pub predicted_class: u8,
    pub churn_probability: f64,
    pub probability_percent: String,
    pub headline: String,
    pub model: &'static str,
    /// Attributes whose unknown level was encoded as all zeros
    pub zero_filled: Vec<String>,
    pub latency_ms: f64,
    pub timestamp_ms: u64,
}

impl PredictionResponse {
    fn new(result: InferenceResult, model: &'static str) -> Self {
        let prediction = result.prediction;
        Self {
            label: prediction.label,
            predicted_class: prediction.predicted_class,
            churn_probability: prediction.churn_probability,
            probability_percent: prediction.probability_percent(),
            headline: prediction.headline(),
            model,
            zero_filled: result.zero_filled,
            latency_ms: result.latency.as_secs_f64() * 1000.0,
            timestamp_ms: prediction.timestamp_ms,
        }
    }
}

fn record_success(result: &InferenceResult) {
    metrics::counter!("churn_predictions_total", "label" => result.prediction.label.as_str())
        .increment(1);
    metrics::histogram!("churn_inference_latency_seconds").record(result.latency.as_secs_f64());
    debug!(
        "Predicted {} ({}) in {:?}",
        result.prediction.label.as_str(),
        result.prediction.probability_percent(),
        result.latency
    );
}

fn record_failure(err: &ApiError) {
    metrics::counter!("churn_prediction_errors_total", "kind" => err.kind()).increment(1);
    warn!("Prediction rejected: {}", err);
}

/// Validate and score a typed record
fn score(state: &SharedState, record: &CustomerRecord) -> Result<InferenceResult, ApiError> {
    let context = state.model.context()?;

    let validation = state.validator.validate_record(record);
    if !validation.valid {
        return Err(ApiError::Validation(validation.message()));
    }

    let result = context.predict(record)?;
    record_success(&result);
    Ok(result)
}

/// Render the empty form, or the load diagnostic
pub async fn form_page(State(state): State<SharedState>) -> (StatusCode, Html<String>) {
    match &state.model {
        ModelStatus::Ready(_) => (
            StatusCode::OK,
            Html(form::render_form(&CustomerRecord::default(), None)),
        ),
        ModelStatus::Unavailable(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(form::render_unavailable(reason)),
        ),
    }
}

/// Score a form submission and re-render the form with the outcome
pub async fn form_submit(
    State(state): State<SharedState>,
    submission: Result<Form<CustomerRecord>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let context = match &state.model {
        ModelStatus::Ready(context) => context,
        ModelStatus::Unavailable(reason) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(form::render_unavailable(reason)),
            )
        }
    };

    // Unparseable fields keep the form usable, starting over from the defaults
    let Form(record) = match submission {
        Ok(form) => form,
        Err(rejection) => {
            let err = ApiError::Validation(rejection.body_text());
            record_failure(&err);
            let page = form::render_form(
                &CustomerRecord::default(),
                Some(Outcome::Error(err.to_string())),
            );
            return (err.status(), Html(page));
        }
    };

    match score(&state, &record) {
        Ok(result) => {
            let outcome = Outcome::Prediction {
                prediction: &result.prediction,
                caption: context.metadata().description.as_deref(),
            };
            (StatusCode::OK, Html(form::render_form(&record, Some(outcome))))
        }
        Err(err) => {
            record_failure(&err);
            let message = match &err {
                ApiError::Validation(message) => message.clone(),
                other => format!("Error during prediction: {other}"),
            };
            (
                err.status(),
                Html(form::render_form(&record, Some(Outcome::Error(message)))),
            )
        }
    }
}

/// Score a typed record
pub async fn predict_json(
    State(state): State<SharedState>,
    submission: Result<Json<CustomerRecord>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(record) = submission
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
        .inspect_err(record_failure)?;
    let result = score(&state, &record).inspect_err(record_failure)?;
    let model = state.model.context()?.engine().model_name();
    Ok(Json(PredictionResponse::new(result, model)))
}

/// Score a loosely-typed attribute map without range checks
pub async fn predict_raw(
    State(state): State<SharedState>,
    submission: Result<Json<RawRecord>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(record) = submission
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
        .inspect_err(record_failure)?;
    let outcome = state
        .model
        .context()
        .and_then(|context| Ok((context.predict_raw(&record)?, context.engine().model_name())));

    let (result, model) = outcome.inspect_err(record_failure)?;
    record_success(&result);
    Ok(Json(PredictionResponse::new(result, model)))
}
