//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for turn records and the
//! in-memory [`EpisodeSnapshot`] that the REST endpoints serve. The engine
//! rebuilds the snapshot after every turn.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use wayfarer_core::Episode;
use wayfarer_core::config::ScoringConfig;
use wayfarer_core::stats::EpisodeStats;
use wayfarer_types::{
    AgentState, Coordinate, EpisodeId, EpisodeStatus, TerrainCost, TerrainKind, TileView,
    TurnOutcome, TurnRecord,
};

/// Capacity of the broadcast channel for turn messages.
///
/// A subscriber more than this many messages behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest one.
const BROADCAST_CAPACITY: usize = 256;

/// Most turn records kept in a snapshot.
pub const SNAPSHOT_HISTORY_LIMIT: usize = 512;

/// JSON-serializable turn summary pushed over the `WebSocket`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TurnBroadcast {
    /// The episode the turn belongs to.
    pub episode_id: EpisodeId,
    /// Turn number.
    pub turn: u64,
    /// The resolved action, e.g. `MOVE EAST`.
    pub action: String,
    /// What happened.
    pub outcome: TurnOutcome,
    /// Agent state after the turn.
    pub state: AgentState,
    /// Episode status after the turn.
    pub status: EpisodeStatus,
}

impl TurnBroadcast {
    /// Project a turn record for broadcast.
    pub fn from_record(episode_id: EpisodeId, record: &TurnRecord, status: &EpisodeStatus) -> Self {
        Self {
            episode_id,
            turn: record.turn,
            action: record.action.to_string(),
            outcome: record.outcome.clone(),
            state: record.state_after,
            status: status.clone(),
        }
    }
}

/// A remembered tile flattened for JSON.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MemoryTile {
    /// Absolute coordinate.
    pub coordinate: Coordinate,
    /// The latest observation.
    pub tile: TileView,
    /// How often the tile has been seen.
    pub observations: u32,
}

/// One terrain catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TerrainRow {
    /// Terrain kind.
    pub terrain: TerrainKind,
    /// Cost of entering it.
    pub cost: TerrainCost,
}

/// In-memory view of the running episode served by REST endpoints.
#[derive(Debug, Clone, Default)]
pub struct EpisodeSnapshot {
    /// `None` until the engine publishes the first snapshot.
    pub episode_id: Option<EpisodeId>,
    /// Lifecycle status.
    pub status: Option<EpisodeStatus>,
    /// Turns played.
    pub turn: u64,
    /// Current agent state.
    pub agent: AgentState,
    /// Starting position.
    pub start: Coordinate,
    /// Grid width.
    pub width: u32,
    /// Grid height.
    pub height: u32,
    /// Recent turn records, oldest first.
    pub history: Vec<TurnRecord>,
    /// The agent's memory, in coordinate order.
    pub memory: Vec<MemoryTile>,
    /// Terrain costs in effect.
    pub terrain: Vec<TerrainRow>,
    /// Rendered text map.
    pub map: String,
    /// Running counters.
    pub stats: EpisodeStats,
    /// Score so far.
    pub score: i64,
}

impl EpisodeSnapshot {
    /// Capture the observable state of `episode`.
    pub fn capture(episode: &Episode, weights: &ScoringConfig) -> Self {
        let records = episode.move_history();
        let skip = records.len().saturating_sub(SNAPSHOT_HISTORY_LIMIT);
        let history = records.into_iter().skip(skip).cloned().collect();

        let memory = episode
            .memory_snapshot()
            .into_iter()
            .map(|(coordinate, entry)| MemoryTile {
                coordinate,
                tile: entry.tile,
                observations: entry.observations,
            })
            .collect();

        let terrain = episode
            .terrain_catalog()
            .entries()
            .map(|(terrain, cost)| TerrainRow { terrain, cost })
            .collect();

        Self {
            episode_id: Some(episode.id()),
            status: Some(episode.status().clone()),
            turn: episode.turn(),
            agent: *episode.agent(),
            start: episode.start(),
            width: episode.world().width(),
            height: episode.world().height(),
            history,
            memory,
            terrain,
            map: episode.render_map(),
            stats: *episode.stats(),
            score: episode.report(weights).score,
        }
    }
}

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for turn messages.
    pub tx: broadcast::Sender<TurnBroadcast>,
    /// The current episode snapshot.
    pub snapshot: Arc<RwLock<EpisodeSnapshot>>,
}

impl AppState {
    /// Create a new application state with an empty snapshot.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(RwLock::new(EpisodeSnapshot::default())),
        }
    }

    /// Subscribe to the turn broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<TurnBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a turn to all connected clients.
    ///
    /// Returns the number of receivers; 0 when nobody is connected.
    pub fn broadcast(&self, turn: &TurnBroadcast) -> usize {
        self.tx.send(turn.clone()).unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
