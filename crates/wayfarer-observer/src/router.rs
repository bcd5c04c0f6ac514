//! Axum router construction for the Observer API.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// CORS allows any origin so a dashboard on another port can poll it.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws/turns", get(ws::ws_turns))
        .route("/api/episode", get(handlers::get_episode))
        .route("/api/history", get(handlers::get_history))
        .route("/api/memory", get(handlers::get_memory))
        .route("/api/terrain", get(handlers::get_terrain))
        .route("/api/map", get(handlers::get_map))
        .route("/api/stats", get(handlers::get_stats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
