use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use voyage_site_core::search::ServerSearchData;

use crate::state::AppState;

/// Server-rendered search data routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/search-data", get(search_data))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDataResponse {
    #[serde(flatten)]
    pub data: ServerSearchData,
    pub is_loading: bool,
    pub has_error: bool,
}

/// Fresh search data for one render. Partial failures are reported per key.
async fn search_data(State(state): State<AppState>) -> Json<SearchDataResponse> {
    let data = state.search_loader().load().await;
    Json(SearchDataResponse {
        is_loading: data.is_loading(),
        has_error: data.has_error(),
        data,
    })
}
