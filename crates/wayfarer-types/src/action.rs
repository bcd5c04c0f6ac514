//! Actions an agent can take and the trade-negotiation payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::grid::Direction;

/// A fully parsed action.
///
/// Policies answer in free text; the engine's parser turns that text into
/// one of these before anything touches world state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", content = "direction")]
pub enum Action {
    /// Step one tile in a direction.
    Move(Direction),
    /// Recover energy at the cost of food and water.
    Rest,
    /// Exchange gold for supplies with a trader on the current tile.
    Trade,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(direction) => write!(f, "MOVE {direction}"),
            Self::Rest => f.write_str("REST"),
            Self::Trade => f.write_str("TRADE"),
        }
    }
}

/// A proposed exchange between the agent and a trader.
///
/// Field names are from the agent's point of view: `*_to_player` flows to
/// the agent, `*_to_trader` flows from the agent to the trader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TradeOffer {
    /// Food the agent receives.
    pub food_to_player: u32,
    /// Water the agent receives.
    pub water_to_player: u32,
    /// Gold the agent receives.
    pub gold_to_player: u32,
    /// Food the agent gives.
    pub food_to_trader: u32,
    /// Water the agent gives.
    pub water_to_trader: u32,
    /// Gold the agent gives.
    pub gold_to_trader: u32,
}

impl TradeOffer {
    /// Total units flowing to the agent.
    pub const fn player_value(&self) -> u32 {
        self.food_to_player
            .saturating_add(self.water_to_player)
            .saturating_add(self.gold_to_player)
    }

    /// Total units flowing to the trader.
    pub const fn trader_value(&self) -> u32 {
        self.food_to_trader
            .saturating_add(self.water_to_trader)
            .saturating_add(self.gold_to_trader)
    }

    /// Whether nothing changes hands.
    pub const fn is_empty(&self) -> bool {
        self.player_value() == 0 && self.trader_value() == 0
    }
}

impl fmt::Display for TradeOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "receive food={} water={} gold={}; give food={} water={} gold={}",
            self.food_to_player,
            self.water_to_player,
            self.gold_to_player,
            self.food_to_trader,
            self.water_to_trader,
            self.gold_to_trader
        )
    }
}

/// A reply in a trade negotiation, from either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "response", content = "offer")]
pub enum TradeResponse {
    /// Take the offer on the table.
    Accept,
    /// Walk away.
    Reject,
    /// Propose different terms.
    CounterOffer(TradeOffer),
}
