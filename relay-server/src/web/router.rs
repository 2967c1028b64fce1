//! Route table for the relay server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{health, relay, AppState};

/// Path the relay was originally served under. `/` is accepted too.
pub const RELAY_PATH: &str = "/api/forward";

/// Build the application router around `state`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/", any(relay))
        .route(RELAY_PATH, any(relay))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
