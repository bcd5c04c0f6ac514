//! Payloads exchanged with a decision policy.
//!
//! The engine serializes a [`DecisionRequest`] for every policy call. The
//! decision service answers with a [`DecisionResponse`] whose `decision` is
//! free text; parsing it is the engine's job.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::action::TradeOffer;
use crate::agent::AgentState;
use crate::grid::TraderPersonality;
use crate::vision::{KnownTile, VisionWindow};

/// Everything a policy may look at when choosing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionRequest {
    /// Current turn number.
    pub turn: u64,
    /// Retry number within the turn (0 for the first request).
    pub attempt: u32,
    /// The agent's state.
    pub agent: AgentState,
    /// Width of the grid; reaching `x >= map_width` escapes.
    pub map_width: u32,
    /// Height of the grid.
    pub map_height: u32,
    /// This turn's vision sample.
    pub vision: VisionWindow,
    /// Remembered tiles relative to the agent's position.
    pub memory: Vec<KnownTile>,
    /// The same tiles as text, one per line, for prompts.
    pub memory_summary: String,
    /// Rendered context of the most recent turns.
    pub recent_turns: String,
    /// Engine notices, e.g. why the previous attempt was rejected.
    pub notifications: Vec<String>,
}

/// A decision service's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionResponse {
    /// Free-text action, e.g. `"MOVE EAST"`.
    pub decision: String,
    /// Set when the service fell back to a default answer.
    #[serde(default)]
    pub fallback_reason: Option<String>,
}

/// One step of a trade negotiation presented to the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TradeRequest {
    /// Current turn number.
    pub turn: u64,
    /// Negotiation round, starting at 0.
    pub round: u32,
    /// The agent's state.
    pub agent: AgentState,
    /// The trader the agent is dealing with.
    pub trader: TraderPersonality,
    /// The trader's standing offer; `None` when the agent must open.
    pub current_offer: Option<TradeOffer>,
}
