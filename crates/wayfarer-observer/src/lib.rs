//! Observer API server for the Wayfarer simulation.
//!
//! An Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/turns`) streaming every resolved turn
//!   via [`tokio::sync::broadcast`]
//! - **REST endpoints** for the episode, turn history, the agent's memory,
//!   the terrain catalog, the text map and statistics
//! - **Minimal HTML page** (`GET /`) with the agent's vitals and the map
//!
//! The observer reads from an [`EpisodeSnapshot`] that the engine replaces
//! after each turn, so it never touches the episode itself.
//!
//! [`EpisodeSnapshot`]: state::EpisodeSnapshot

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{ObserverHandle, ServerError, spawn_observer};
pub use state::{AppState, EpisodeSnapshot, TurnBroadcast};
