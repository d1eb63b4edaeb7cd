//! HTTP service for the voyage site: booking dates, search data, and
//! per-session state.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;

pub use config::AppConfig;
pub use state::AppState;

/// Router with all routes and the standard middleware stack.
pub fn app(state: AppState, cors_allow_origin: Option<&str>) -> Router {
    routes::build_router(state)
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer(cors_allow_origin))
}

/// Close idle sessions every `every`, for as long as the runtime lives.
pub fn spawn_session_sweeper(state: AppState, idle_timeout: Duration, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let expired = state.sessions().sweep_idle(idle_timeout);
            if expired > 0 {
                tracing::info!(expired, open = state.sessions().len(), "swept idle sessions");
            }
        }
    })
}
