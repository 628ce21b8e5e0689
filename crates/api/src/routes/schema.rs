//! Schema Route

use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{ApiError, SharedState};

/// Training schema as seen by the aligner
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub levels: BTreeMap<String, Vec<String>>,
    pub unknown_level_policy: feature_engine::UnknownLevelPolicy,
}

/// Get the loaded schema
pub async fn get_schema(State(state): State<SharedState>) -> Result<Json<SchemaResponse>, ApiError> {
    let context = state.model.context()?;
    let schema = context.schema();

    Ok(Json(SchemaResponse {
        columns: schema.columns().to_vec(),
        numeric_columns: schema.numeric_columns().to_vec(),
        categorical_columns: schema.categorical_columns().to_vec(),
        levels: schema.all_levels().clone(),
        unknown_level_policy: context.policy(),
    }))
}
