use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/ping", get(ping))
}

/// Full health check: database and content source must both answer.
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state
        .travel_dates()
        .ping()
        .await
        .map_err(|e| ApiError::Internal(format!("database health check failed: {e}")))?;

    state
        .content()
        .ping()
        .await
        .map_err(|e| ApiError::Internal(format!("content health check failed: {e}")))?;

    Ok(Json(json!({
        "status": "ok",
        "database": "connected",
        "content": "available",
        "sessions": state.sessions().len(),
    })))
}

/// Lightweight ping, no backend checks.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
