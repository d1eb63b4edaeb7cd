use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use voyage_site_core::perf::MetricsExport;
use voyage_site_core::search::SearchDataSnapshot;
use voyage_site_core::session::SessionContext;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Session lifecycle and per-session search data and metrics.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/sessions", post(open_session))
        .route("/v1/sessions/{id}", delete(close_session))
        .route(
            "/v1/sessions/{id}/search-data",
            get(session_search_data).delete(clear_search_data),
        )
        .route(
            "/v1/sessions/{id}/metrics",
            get(session_metrics).delete(clear_metrics),
        )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

fn lookup(state: &AppState, id: Uuid) -> ApiResult<Arc<SessionContext>> {
    state
        .sessions()
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("session {id}")))
}

async fn open_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let session = state.sessions().open();
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            id: session.id(),
            created_at: session.created_at(),
        }),
    )
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.sessions().close(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("session {id}")))
    }
}

/// Load whatever is not cached yet, then return every entry with its status.
async fn session_search_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SearchDataSnapshot>> {
    let session = lookup(&state, id)?;
    let _ = session
        .performance()
        .track_api_call("search-data", async {
            session.search().initialize_search_data().await;
            Ok::<_, Infallible>(())
        })
        .await;
    Ok(Json(session.search().snapshot()))
}

async fn clear_search_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    lookup(&state, id)?.search().clear_search_data();
    Ok(StatusCode::NO_CONTENT)
}

async fn session_metrics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MetricsExport>> {
    Ok(Json(lookup(&state, id)?.performance().export_metrics()))
}

async fn clear_metrics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    lookup(&state, id)?.performance().clear_metrics();
    Ok(StatusCode::NO_CONTENT)
}
