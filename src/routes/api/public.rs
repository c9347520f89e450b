use std::sync::Arc;

use axum::{Router, extract::State, routing::get};
use serde_json::json;

use crate::{
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<Arc<AppState>>) -> ApiResult<serde_json::Value> {
    state
        .db
        .ping()
        .await
        .map_err(|err| AppError::internal_with_source("Database unavailable", err))?;
    JsonApiResponse::ok(json!({ "status": "ok" }))
}
