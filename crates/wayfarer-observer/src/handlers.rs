//! REST API endpoint handlers for the Observer server.
//!
//! All handlers read from the in-memory [`EpisodeSnapshot`] via the shared
//! [`AppState`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/episode` | Status, turn, agent and grid size |
//! | `GET` | `/api/history` | Recent turn records (`?limit=N`) |
//! | `GET` | `/api/memory` | The agent's remembered tiles |
//! | `GET` | `/api/terrain` | Terrain costs |
//! | `GET` | `/api/map` | Text map |
//! | `GET` | `/api/stats` | Counters and score |
//!
//! [`EpisodeSnapshot`]: crate::state::EpisodeSnapshot

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use wayfarer_types::EpisodeStatus;

use crate::error::ObserverError;
use crate::state::AppState;

/// Default number of turns returned by `/api/history`.
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Query parameters for the `GET /api/history` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of turns to return, newest last (default 50).
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with the agent's vitals, the map and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let status = snapshot
        .status
        .as_ref()
        .map_or_else(|| String::from("WAITING"), EpisodeStatus::to_string);
    let agent = snapshot.agent;
    let vitals = [
        ("Status", status),
        ("Turn", snapshot.turn.to_string()),
        ("Position", agent.position.to_string()),
        ("Food", agent.food.to_string()),
        ("Water", agent.water.to_string()),
        ("Energy", agent.energy.to_string()),
        ("Gold", agent.gold.to_string()),
        ("Score", snapshot.score.to_string()),
    ]
    .iter()
    .map(|(label, value)| format!("<tr><th>{label}</th><td>{value}</td></tr>"))
    .collect::<Vec<_>>()
    .join("\n        ");
    let links = ["episode", "history", "memory", "terrain", "map", "stats"]
        .iter()
        .map(|name| format!("<li><a href=\"/api/{name}\">/api/{name}</a></li>"))
        .collect::<Vec<_>>()
        .join("\n        ");

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta http-equiv="refresh" content="2">
    <title>Wayfarer Observer</title>
    <style>
        body {{ background: #10141a; color: #d8dee9; font-family: monospace; margin: 2rem auto; max-width: 760px; }}
        h1 {{ color: #88c0d0; }}
        th {{ color: #81a1c1; text-align: left; padding-right: 2rem; }}
        pre {{ background: #1b2029; padding: 1rem; line-height: 1.1; }}
        a {{ color: #a3be8c; }}
    </style>
</head>
<body>
    <h1>Wayfarer Observer</h1>
    <table>
        {vitals}
    </table>
    <pre>{map}</pre>
    <ul>
        {links}
    </ul>
    <p>Live turns: <code>ws://host:port/ws/turns</code></p>
</body>
</html>"#,
        map = snapshot.map,
    ))
}

// ---------------------------------------------------------------------------
// GET /api/episode
// ---------------------------------------------------------------------------

/// Episode identity, status, turn, agent state and grid size.
pub async fn get_episode(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    let episode_id = snapshot
        .episode_id
        .ok_or(ObserverError::NoEpisode)?;

    Ok(Json(serde_json::json!({
        "episode_id": episode_id,
        "status": snapshot.status,
        "turn": snapshot.turn,
        "agent": snapshot.agent,
        "start": snapshot.start,
        "width": snapshot.width,
        "height": snapshot.height,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/history
// ---------------------------------------------------------------------------

/// The most recent turn records, oldest first.
///
/// # Query Parameters
///
/// - `limit`: number of turns (default 50, at least 1).
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 {
        return Err(ObserverError::InvalidQuery {
            param: "limit",
            reason: String::from("must be at least 1"),
        });
    }

    let snapshot = state.snapshot.read().await;
    let skip = snapshot.history.len().saturating_sub(limit);
    let turns: Vec<serde_json::Value> = snapshot
        .history
        .iter()
        .skip(skip)
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;

    Ok(Json(serde_json::json!({
        "count": turns.len(),
        "turns": turns,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/memory
// ---------------------------------------------------------------------------

/// Every remembered tile, in coordinate order.
pub async fn get_memory(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    Ok(Json(serde_json::json!({
        "count": snapshot.memory.len(),
        "tiles": serde_json::to_value(&snapshot.memory)?,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/terrain
// ---------------------------------------------------------------------------

/// The terrain catalog in effect.
pub async fn get_terrain(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    Ok(Json(serde_json::json!({
        "terrain": serde_json::to_value(&snapshot.terrain)?,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/map
// ---------------------------------------------------------------------------

/// The rendered text map.
pub async fn get_map(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    if snapshot.episode_id.is_none() {
        return Err(ObserverError::NoEpisode);
    }
    Ok(snapshot.map.clone())
}

// ---------------------------------------------------------------------------
// GET /api/stats
// ---------------------------------------------------------------------------

/// Running counters and the score so far.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    Ok(Json(serde_json::json!({
        "turn": snapshot.turn,
        "stats": serde_json::to_value(snapshot.stats)?,
        "score": snapshot.score,
    })))
}
