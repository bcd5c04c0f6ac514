//! Turn callback that updates the Observer API state.
//!
//! After each turn, this callback rebuilds the in-memory
//! [`EpisodeSnapshot`] and broadcasts a [`TurnBroadcast`] to all connected
//! `WebSocket` clients.

use std::sync::Arc;

use tracing::debug;
use wayfarer_core::config::ScoringConfig;
use wayfarer_core::{Episode, TurnCallback};
use wayfarer_observer::state::{AppState, EpisodeSnapshot, TurnBroadcast};
use wayfarer_types::TurnRecord;

/// Callback that bridges the turn loop to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
    scoring: ScoringConfig,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>, scoring: ScoringConfig) -> Self {
        Self { state, scoring }
    }

    /// Publish the episode before its first turn so the API is not empty.
    pub fn publish_initial(&self, episode: &Episode) {
        if let Ok(mut snap) = self.state.snapshot.try_write() {
            *snap = EpisodeSnapshot::capture(episode, &self.scoring);
        }
    }
}

/// Publish the finished episode, waiting for any reader to release the lock.
pub async fn publish_final(state: &AppState, episode: &Episode, scoring: &ScoringConfig) {
    *state.snapshot.write().await = EpisodeSnapshot::capture(episode, scoring);
}

impl TurnCallback for ObserverCallback {
    fn on_turn(&mut self, record: &TurnRecord, episode: &Episode) {
        let turn = TurnBroadcast::from_record(episode.id(), record, episode.status());
        let receivers = self.state.broadcast(&turn);
        debug!(turn = record.turn, receivers, "Turn broadcast sent");

        // try_write keeps the turn loop from blocking behind a REST reader.
        // A skipped update is caught up on the next turn, or by
        // `publish_final` after the last one.
        if let Ok(mut snap) = self.state.snapshot.try_write() {
            *snap = EpisodeSnapshot::capture(episode, &self.scoring);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use wayfarer_core::{EpisodeSettings, FixedPolicy, StepOutcome};
    use wayfarer_types::{AgentState, Coordinate, EpisodeStatus, TerrainKind, Tile};
    use wayfarer_world::WorldGrid;

    use super::*;

    fn plains_episode() -> Episode {
        let tiles: BTreeMap<Coordinate, Tile> = (0..4)
            .map(|x| (Coordinate::new(x, 0), Tile::bare(TerrainKind::Plains)))
            .collect();
        let world = WorldGrid::from_tiles(4, 1, tiles).unwrap();
        let agent = AgentState {
            position: Coordinate::new(0, 0),
            food: 10,
            water: 10,
            energy: 10,
            gold: 0,
        };
        Episode::new(world, agent, EpisodeSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn turn_updates_snapshot_and_broadcasts() {
        let state = Arc::new(AppState::new());
        let mut rx = state.subscribe();
        let mut callback = ObserverCallback::new(Arc::clone(&state), ScoringConfig::default());
        let mut episode = plains_episode();
        callback.publish_initial(&episode);
        assert_eq!(state.snapshot.read().await.turn, 0);

        let mut policy = FixedPolicy::new("MOVE EAST");
        let record = match episode.step(&mut policy).unwrap() {
            StepOutcome::Advanced(record) => Some(record),
            StepOutcome::Terminal(_) => None,
        }
        .unwrap();
        callback.on_turn(&record, &episode);

        let snapshot = state.snapshot.read().await;
        assert_eq!(snapshot.turn, 1);
        assert_eq!(snapshot.agent.position, Coordinate::new(1, 0));
        assert_eq!(snapshot.history.len(), 1);
        drop(snapshot);

        let sent = rx.recv().await.unwrap();
        assert_eq!(sent.turn, 1);
        assert_eq!(sent.action, "MOVE EAST");
    }

    #[tokio::test]
    async fn final_publish_replaces_a_stale_snapshot() {
        let state = Arc::new(AppState::new());
        let mut callback = ObserverCallback::new(Arc::clone(&state), ScoringConfig::default());
        let mut episode = plains_episode();
        let mut policy = FixedPolicy::new("MOVE EAST");

        // A reader holding the lock makes every per-turn update skip.
        let reader = state.snapshot.read().await;
        let mut last = None;
        while let StepOutcome::Advanced(record) = episode.step(&mut policy).unwrap() {
            callback.on_turn(&record, &episode);
            last = Some(record.turn);
        }
        assert_eq!(last, Some(4));
        assert_eq!(reader.turn, 0);
        drop(reader);

        publish_final(&state, &episode, &ScoringConfig::default()).await;

        let snapshot = state.snapshot.read().await;
        assert_eq!(snapshot.turn, 4);
        assert_eq!(snapshot.status, Some(EpisodeStatus::Escaped));
    }
}
