pub mod booking;
pub mod health;
pub mod search;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(booking::routes())
        .merge(search::routes())
        .merge(sessions::routes())
        .with_state(state)
}
