//! Churn Predictor API Server
//!
//! HTML form and JSON API in front of the prediction context.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use data_validator::Validator;
use inference_engine::PredictionContext;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod form;
mod routes;

pub use config::{LogFormat, ServerConfig};
pub use error::ApiError;

/// Outcome of loading the model artifact at startup
pub enum ModelStatus {
    Ready(PredictionContext),
    /// Load failed; holds the diagnostic shown to users
    Unavailable(String),
}

impl ModelStatus {
    /// Load the configured artifact, keeping the diagnostic on failure
    pub fn load(config: &ServerConfig) -> Self {
        match PredictionContext::load(&config.artifact_path, config.unknown_level_policy) {
            Ok(context) => ModelStatus::Ready(context),
            Err(e) => {
                error!("Error loading model artifacts: {}", e);
                ModelStatus::Unavailable(e.to_string())
            }
        }
    }

    /// The loaded context, or the diagnostic as an API error
    pub fn context(&self) -> Result<&PredictionContext, ApiError> {
        match self {
            ModelStatus::Ready(context) => Ok(context),
            ModelStatus::Unavailable(reason) => Err(ApiError::Unavailable(reason.clone())),
        }
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Loaded model or load diagnostic
    pub model: ModelStatus,
    /// Range checks for form submissions
    pub validator: Validator,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exporter, absent when no recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(model: ModelStatus, validator: Validator) -> Self {
        Self {
            model,
            validator,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub type SharedState = Arc<AppState>;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelHealth,
}

/// Model component health
#[derive(Debug, Serialize)]
pub struct ModelHealth {
    pub loaded: bool,
    pub name: Option<&'static str>,
    pub n_features: Option<usize>,
    pub description: Option<String>,
    pub error: Option<String>,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(routes::predictions::form_page))
        .route("/predict", post(routes::predictions::form_submit))
        .route("/api/v1/predict", post(routes::predictions::predict_json))
        .route("/api/v1/predict/raw", post(routes::predictions::predict_raw))
        .route("/api/v1/schema", get(routes::schema::get_schema))
        .route("/api/v1/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let (status, model) = match &state.model {
        ModelStatus::Ready(context) => (
            "healthy",
            ModelHealth {
                loaded: true,
                name: Some(context.engine().model_name()),
                n_features: Some(context.schema().len()),
                description: context.metadata().description.clone(),
                error: None,
            },
        ),
        ModelStatus::Unavailable(reason) => (
            "unavailable",
            ModelHealth {
                loaded: false,
                name: None,
                n_features: None,
                description: None,
                error: Some(reason.clone()),
            },
        ),
    };

    Json(HealthResponse {
        status,
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model,
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(
    level: &str,
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(level)?)
        .with_target(true);

    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

/// Run the server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let validator = Validator::new(config.validation.clone());
    let state = AppState::new(ModelStatus::load(&config), validator).with_metrics(handle);
    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
