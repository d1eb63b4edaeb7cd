use std::time::Instant;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use voyage_site_core::dates::{aggregate_interest, StoreError, TravelDateAvailability};

use crate::state::AppState;

/// Booking routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/booking/{slug}/dates", get(travel_dates))
}

/// Body of the dates endpoint: the dates, or the store's error.
///
/// Both are served with a 200 status; clients tell them apart by shape.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DatesResponse {
    Dates(Vec<TravelDateAvailability>),
    Failed { error: StoreError },
}

/// Upcoming published departures of a voyage with their interested counts.
#[tracing::instrument(skip(state))]
async fn travel_dates(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Json<DatesResponse> {
    let started = Instant::now();
    let result = state.travel_dates().upcoming_dates(&slug, Utc::now()).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(rows) => {
            tracing::debug!(rows = rows.len(), elapsed_ms, "travel dates fetched");
            Json(DatesResponse::Dates(aggregate_interest(rows)))
        }
        Err(error) => {
            tracing::error!(%error, elapsed_ms, "travel dates query failed");
            Json(DatesResponse::Failed { error })
        }
    }
}
