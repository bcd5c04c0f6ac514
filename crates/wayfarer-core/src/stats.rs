//! Episode statistics, score and end-of-run report.

use std::fmt;

use serde::{Deserialize, Serialize};
use wayfarer_types::{
    AgentState, Coordinate, EpisodeId, EpisodeStatus, ItemKind, TurnOutcome, TurnRecord,
};

use crate::config::ScoringConfig;

/// Running counters over every resolved turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStats {
    /// Turns resolved.
    pub turns: u64,
    /// Moves onto a tile or off the eastern edge.
    pub moves: u64,
    /// Rests chosen by the policy.
    pub rests: u64,
    /// Rests forced by the retry ceiling.
    pub forced_rests: u64,
    /// Completed trades.
    pub trades: u64,
    /// Trade attempts that failed.
    pub failed_trades: u64,
    /// Invalid moves rejected.
    pub invalid_moves: u64,
    /// Turns where the engine replaced the policy's answer.
    pub fallbacks: u64,
    /// Food gained from bonuses.
    pub food_collected: u64,
    /// Water gained from bonuses.
    pub water_collected: u64,
    /// Gold gained from bonuses.
    pub gold_collected: u64,
    /// Energy gained from rest.
    pub energy_gained: u64,
    /// Food consumed or traded away.
    pub food_spent: u64,
    /// Water consumed or traded away.
    pub water_spent: u64,
    /// Energy consumed.
    pub energy_spent: u64,
    /// Gold paid to traders.
    pub gold_spent: u64,
}

impl EpisodeStats {
    /// Fold one turn record into the counters.
    pub fn record(&mut self, record: &TurnRecord) {
        self.turns = self.turns.saturating_add(1);
        self.invalid_moves = self
            .invalid_moves
            .saturating_add(u64::from(record.invalid_attempts));
        if record.fallback.is_some() {
            self.fallbacks = self.fallbacks.saturating_add(1);
        }

        match &record.outcome {
            TurnOutcome::Moved { collected, .. } => {
                self.moves = self.moves.saturating_add(1);
                for (kind, amount) in collected {
                    let amount = u64::from(*amount);
                    let counter = match kind {
                        ItemKind::FoodBonus => &mut self.food_collected,
                        ItemKind::WaterBonus => &mut self.water_collected,
                        ItemKind::GoldBonus => &mut self.gold_collected,
                        ItemKind::Trader => continue,
                    };
                    *counter = counter.saturating_add(amount);
                }
            }
            TurnOutcome::Escaped { .. } => self.moves = self.moves.saturating_add(1),
            TurnOutcome::Rested => self.rests = self.rests.saturating_add(1),
            TurnOutcome::ForcedRest => self.forced_rests = self.forced_rests.saturating_add(1),
            TurnOutcome::Traded { .. } => self.trades = self.trades.saturating_add(1),
            TurnOutcome::TradeFailed { .. } => {
                self.failed_trades = self.failed_trades.saturating_add(1);
            }
        }

        let before = record.state;
        let after = record.state_after;
        self.food_spent = self.food_spent.saturating_add(decrease(before.food, after.food));
        self.water_spent = self.water_spent.saturating_add(decrease(before.water, after.water));
        self.energy_spent = self.energy_spent.saturating_add(decrease(before.energy, after.energy));
        self.gold_spent = self.gold_spent.saturating_add(decrease(before.gold, after.gold));
        self.energy_gained = self
            .energy_gained
            .saturating_add(decrease(after.energy, before.energy));
    }
}

fn decrease(before: u32, after: u32) -> u64 {
    u64::from(before.saturating_sub(after))
}

/// Weighted score of a finished (or stopped) episode.
pub fn score(
    weights: &ScoringConfig,
    status: &EpisodeStatus,
    distance_east: i64,
    final_state: &AgentState,
    stats: &EpisodeStats,
) -> i64 {
    let escaped = if matches!(status, EpisodeStatus::Escaped) {
        weights.escape_bonus
    } else {
        0
    };
    let supplies = i64::from(final_state.food)
        .saturating_add(i64::from(final_state.water))
        .saturating_add(i64::from(final_state.energy));
    let invalid = i64::try_from(stats.invalid_moves).unwrap_or(i64::MAX);
    let turns = i64::try_from(stats.turns).unwrap_or(i64::MAX);

    escaped
        .saturating_add(distance_east.saturating_mul(weights.distance_weight))
        .saturating_add(supplies.saturating_mul(weights.resource_weight))
        .saturating_add(i64::from(final_state.gold).saturating_mul(weights.gold_weight))
        .saturating_sub(invalid.saturating_mul(weights.invalid_move_penalty))
        .saturating_sub(turns.saturating_mul(weights.turn_penalty))
}

/// Summary of an episode, printable and serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeReport {
    /// The episode.
    pub episode_id: EpisodeId,
    /// Where the episode ended up.
    pub outcome: EpisodeStatus,
    /// Turns resolved.
    pub total_turns: u64,
    /// Moves made.
    pub total_moves: u64,
    /// Starting position.
    pub start: Coordinate,
    /// Final position.
    pub end: Coordinate,
    /// Columns gained eastward (negative if the agent drifted west).
    pub distance_east: i64,
    /// Final resources.
    pub final_state: AgentState,
    /// All counters.
    pub stats: EpisodeStats,
    /// Weighted score.
    pub score: i64,
}

impl fmt::Display for EpisodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Episode Report ===")?;
        writeln!(f, "Episode: {}", self.episode_id)?;
        writeln!(f, "Outcome: {}", self.outcome)?;
        writeln!(f, "Total Turns: {}", self.total_turns)?;
        writeln!(f, "Total Moves: {}", self.total_moves)?;
        writeln!(f, "Starting Position: {}", self.start)?;
        writeln!(f, "Final Position: {}", self.end)?;
        writeln!(f, "Distance Traveled East: {}", self.distance_east)?;
        writeln!(f, "Final Food: {}", self.final_state.food)?;
        writeln!(f, "Final Water: {}", self.final_state.water)?;
        writeln!(f, "Final Energy: {}", self.final_state.energy)?;
        writeln!(f, "Final Gold: {}", self.final_state.gold)?;
        writeln!(
            f,
            "Rests: {} (forced {})  Trades: {} (failed {})  Invalid moves: {}",
            self.stats.rests,
            self.stats.forced_rests,
            self.stats.trades,
            self.stats.failed_trades,
            self.stats.invalid_moves
        )?;
        writeln!(
            f,
            "Collected: food {} water {} gold {}",
            self.stats.food_collected, self.stats.water_collected, self.stats.gold_collected
        )?;
        write!(f, "Score: {}", self.score)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use wayfarer_types::{Action, Direction, TerrainKind};

    use super::*;

    fn state(x: i32, food: u32, energy: u32, gold: u32) -> AgentState {
        AgentState {
            position: Coordinate::new(x, 0),
            food,
            water: food,
            energy,
            gold,
        }
    }

    fn record(outcome: TurnOutcome, before: AgentState, after: AgentState) -> TurnRecord {
        TurnRecord {
            turn: 1,
            state: before,
            decision: String::new(),
            action: Action::Move(Direction::East),
            outcome,
            invalid_attempts: 2,
            fallback: None,
            state_after: after,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn move_with_bonus_updates_counters() {
        let mut stats = EpisodeStats::default();
        stats.record(&record(
            TurnOutcome::Moved {
                from: Coordinate::new(0, 0),
                to: Coordinate::new(1, 0),
                terrain: TerrainKind::Plains,
                collected: vec![(ItemKind::GoldBonus, 5)],
            },
            state(0, 10, 10, 0),
            state(1, 9, 9, 5),
        ));
        assert_eq!(stats.turns, 1);
        assert_eq!(stats.moves, 1);
        assert_eq!(stats.gold_collected, 5);
        assert_eq!(stats.food_spent, 1);
        assert_eq!(stats.energy_spent, 1);
        assert_eq!(stats.invalid_moves, 2);
    }

    #[test]
    fn rest_counts_energy_gained() {
        let mut stats = EpisodeStats::default();
        stats.record(&record(
            TurnOutcome::Rested,
            state(0, 10, 10, 0),
            state(0, 9, 15, 0),
        ));
        assert_eq!(stats.rests, 1);
        assert_eq!(stats.energy_gained, 5);
        assert_eq!(stats.energy_spent, 0);
    }

    #[test]
    fn score_rewards_escape_and_distance() {
        let weights = ScoringConfig::default();
        let stats = EpisodeStats {
            turns: 5,
            ..EpisodeStats::default()
        };
        let final_state = state(5, 6, 6, 0);
        let escaped = score(&weights, &EpisodeStatus::Escaped, 5, &final_state, &stats);
        let depleted = score(&weights, &EpisodeStatus::Depleted, 5, &final_state, &stats);
        assert_eq!(escaped, 163);
        assert_eq!(escaped.saturating_sub(depleted), 100);
    }

    #[test]
    fn report_text_lists_final_resources() {
        let report = EpisodeReport {
            episode_id: EpisodeId::new(),
            outcome: EpisodeStatus::Escaped,
            total_turns: 5,
            total_moves: 5,
            start: Coordinate::new(0, 0),
            end: Coordinate::new(5, 0),
            distance_east: 5,
            final_state: state(5, 6, 6, 0),
            stats: EpisodeStats::default(),
            score: 1,
        };
        let text = report.to_string();
        assert!(text.contains("Outcome: ESCAPED"));
        assert!(text.contains("Distance Traveled East: 5"));
        assert!(text.contains("Final Food: 6"));
        assert!(text.ends_with("Score: 1"));
    }
}
