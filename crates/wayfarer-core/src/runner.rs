//! Episode loop runner.
//!
//! [`run_episode`] drives [`Episode::step`] until the episode reaches a
//! terminal state or the turn limit, invoking a [`TurnCallback`] after each
//! resolved turn and sleeping between turns when a delay is configured.

use std::time::Duration;

use tracing::info;
use wayfarer_types::{EpisodeStatus, TurnRecord};

use crate::episode::{Episode, EpisodeError, StepOutcome};
use crate::policy::Policy;

/// Why the run loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The episode reached a terminal status.
    Terminal(EpisodeStatus),
    /// The turn limit was hit while the episode was still running.
    TurnLimit,
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRunResult {
    /// Why the loop stopped.
    pub end_reason: EndReason,
    /// Turns resolved by this call.
    pub turns_played: u64,
}

/// Callback invoked after each resolved turn.
///
/// The engine uses this to refresh the observer snapshot and broadcast the
/// turn record.
pub trait TurnCallback: Send {
    /// Called with the turn just recorded and the episode after it.
    fn on_turn(&mut self, record: &TurnRecord, episode: &Episode);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl TurnCallback for NoOpCallback {
    fn on_turn(&mut self, _record: &TurnRecord, _episode: &Episode) {}
}

/// Run `episode` until it ends or `max_turns` turns have been played.
///
/// A `max_turns` of zero means no limit.
///
/// # Errors
///
/// Returns [`EpisodeError`] if a turn hits an invariant violation. The
/// episode is left `Errored` with its history intact.
pub async fn run_episode(
    episode: &mut Episode,
    policy: &mut dyn Policy,
    max_turns: u64,
    turn_delay: Duration,
    callback: &mut dyn TurnCallback,
) -> Result<EpisodeRunResult, EpisodeError> {
    let mut turns_played: u64 = 0;

    info!(
        episode_id = %episode.id(),
        max_turns,
        turn_delay_ms = turn_delay.as_millis(),
        "episode run starting"
    );

    loop {
        let record = match episode.step(policy)? {
            StepOutcome::Advanced(record) => record,
            StepOutcome::Terminal(status) => return Ok(finished(episode, status, turns_played)),
        };
        turns_played = turns_played.saturating_add(1);

        callback.on_turn(&record, episode);

        // A turn that ends the episode wins over the turn limit.
        if episode.status().is_terminal() {
            let status = episode.status().clone();
            return Ok(finished(episode, status, turns_played));
        }
        if max_turns > 0 && turns_played >= max_turns {
            info!(episode_id = %episode.id(), turns_played, "turn limit reached");
            return Ok(EpisodeRunResult {
                end_reason: EndReason::TurnLimit,
                turns_played,
            });
        }

        if !turn_delay.is_zero() {
            tokio::time::sleep(turn_delay).await;
        }
    }
}

fn finished(episode: &Episode, status: EpisodeStatus, turns_played: u64) -> EpisodeRunResult {
    info!(episode_id = %episode.id(), %status, turns_played, "episode run finished");
    EpisodeRunResult {
        end_reason: EndReason::Terminal(status),
        turns_played,
    }
}
