//! Episode lifecycle and the per-turn audit record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::action::{Action, TradeOffer};
use crate::agent::AgentState;
use crate::grid::{Coordinate, ItemKind, TerrainKind};

/// Identifier of one simulation episode (UUID v7, time-ordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EpisodeId(pub Uuid);

impl EpisodeId {
    /// Create a new identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`].
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for EpisodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an episode is in its lifecycle. Everything but `Running` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "status", content = "reason")]
pub enum EpisodeStatus {
    /// Turns are still being played.
    Running,
    /// The agent stepped past the eastern edge.
    Escaped,
    /// Food, water or energy ran out.
    Depleted,
    /// An internal invariant was violated.
    Errored(String),
}

impl EpisodeStatus {
    /// Whether no further turns will be played.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("RUNNING"),
            Self::Escaped => f.write_str("ESCAPED"),
            Self::Depleted => f.write_str("DEPLETED"),
            Self::Errored(reason) => write!(f, "ERRORED ({reason})"),
        }
    }
}

/// Why a trade attempt did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TradeFailure {
    /// There is no trader on the agent's tile.
    NoTrader,
    /// The agent cannot pay.
    InsufficientGold {
        /// Gold the agent holds.
        available: u32,
        /// Gold the trade requires.
        required: u32,
    },
    /// The agent lacks the food or water the offer asks for.
    InsufficientGoods,
    /// The negotiation ended without agreement.
    Declined,
}

impl fmt::Display for TradeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTrader => f.write_str("no trader here"),
            Self::InsufficientGold {
                available,
                required,
            } => write!(f, "insufficient gold ({available} < {required})"),
            Self::InsufficientGoods => f.write_str("insufficient goods to give"),
            Self::Declined => f.write_str("negotiation declined"),
        }
    }
}

/// What resolving the turn's action did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind")]
pub enum TurnOutcome {
    /// The agent entered a tile and paid its terrain cost.
    Moved {
        /// Where the agent came from.
        from: Coordinate,
        /// Where the agent ended up.
        to: Coordinate,
        /// Terrain of the entered tile.
        terrain: TerrainKind,
        /// Bonuses collected on arrival, with the amount actually gained.
        collected: Vec<(ItemKind, u32)>,
    },
    /// The agent stepped past the eastern edge at no cost.
    Escaped {
        /// Where the agent came from.
        from: Coordinate,
        /// The off-grid position.
        to: Coordinate,
    },
    /// The agent rested by choice.
    Rested,
    /// The agent exhausted its invalid-move retries and was made to rest.
    ForcedRest,
    /// A trade completed.
    Traded {
        /// The terms that were applied.
        offer: TradeOffer,
    },
    /// A trade was attempted and failed; the turn is still consumed.
    TradeFailed {
        /// Why it failed.
        reason: TradeFailure,
    },
}

/// Why the engine substituted a different action for the policy's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "cause", content = "detail")]
pub enum FallbackCause {
    /// The policy call itself failed.
    PolicyFailure(String),
    /// The policy answered with text that is not an action.
    Unparseable(String),
}

impl fmt::Display for FallbackCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolicyFailure(detail) => write!(f, "policy failure: {detail}"),
            Self::Unparseable(detail) => write!(f, "unparseable decision: {detail}"),
        }
    }
}

/// One entry in the append-only turn log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TurnRecord {
    /// Turn number, starting at 1.
    pub turn: u64,
    /// Agent state when the decision was requested.
    pub state: AgentState,
    /// Raw text of the last policy answer, empty if the policy failed.
    pub decision: String,
    /// The action that was resolved.
    pub action: Action,
    /// What happened.
    pub outcome: TurnOutcome,
    /// Invalid moves rejected before the final action.
    pub invalid_attempts: u32,
    /// Set when the engine replaced the policy's answer.
    pub fallback: Option<FallbackCause>,
    /// Agent state after resolution.
    pub state_after: AgentState,
    /// When the record was written.
    pub recorded_at: DateTime<Utc>,
}

impl TurnRecord {
    /// Text block used as recency context: turn, state and decision.
    pub fn context_block(&self) -> String {
        format!(
            "Turn {}:\nState: {}\nDecision: {}",
            self.turn, self.state, self.action
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_running_is_non_terminal() {
        assert!(!EpisodeStatus::Running.is_terminal());
        assert!(EpisodeStatus::Escaped.is_terminal());
        assert!(EpisodeStatus::Depleted.is_terminal());
        assert!(EpisodeStatus::Errored(String::from("x")).is_terminal());
    }

    #[test]
    fn context_block_layout() {
        let state = AgentState {
            position: Coordinate::new(0, 0),
            food: 5,
            water: 5,
            energy: 5,
            gold: 0,
        };
        let record = TurnRecord {
            turn: 3,
            state,
            decision: String::from("rest please"),
            action: Action::Rest,
            outcome: TurnOutcome::Rested,
            invalid_attempts: 0,
            fallback: None,
            state_after: state,
            recorded_at: Utc::now(),
        };
        assert_eq!(
            record.context_block(),
            "Turn 3:\nState: position=(0, 0) food=5 water=5 energy=5 gold=0\nDecision: REST"
        );
    }
}
