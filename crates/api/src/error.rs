//! API Error Responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inference_engine::PredictionError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the JSON endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    /// Artifact failed to load at startup
    #[error("model unavailable: {0}")]
    Unavailable(String),

    /// Range checks failed
    #[error("{0}")]
    Validation(String),

    /// Alignment or scoring failed
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    /// Machine-readable error kind, also used as the metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Validation(_) => "validation",
            ApiError::Prediction(e) if e.is_schema_mismatch() => "schema_mismatch",
            ApiError::Prediction(_) => "prediction_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Prediction(e) if e.is_schema_mismatch() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
