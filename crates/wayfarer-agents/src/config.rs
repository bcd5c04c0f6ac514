//! Tunable rules for resource accounting.
//!
//! These values correspond to the `rules` section of `wayfarer-config.yaml`.
//! [`AgentRules`] bundles every tunable so the engine and tests can override
//! defaults in one place.

use wayfarer_types::Resource;

/// Upper bounds applied whenever a resource is gained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCaps {
    /// Maximum food (default: 50).
    pub food: u32,
    /// Maximum water (default: 50).
    pub water: u32,
    /// Maximum energy (default: 50).
    pub energy: u32,
    /// Maximum gold (default: 50).
    pub gold: u32,
}

impl ResourceCaps {
    /// The cap for `resource`.
    pub const fn cap(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Food => self.food,
            Resource::Water => self.water,
            Resource::Energy => self.energy,
            Resource::Gold => self.gold,
        }
    }
}

impl Default for ResourceCaps {
    fn default() -> Self {
        Self {
            food: 50,
            water: 50,
            energy: 50,
            gold: 50,
        }
    }
}

/// Rules governing rest, trading, and invalid-move retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRules {
    /// Energy recovered by a rest (default: 5).
    pub rest_energy: u32,
    /// Food and water consumed by a rest (default: 1).
    pub rest_upkeep: u32,
    /// Gold paid for a fixed trade (default: 3).
    pub trade_cost: u32,
    /// Food received from a fixed trade (default: 1).
    pub trade_food: u32,
    /// Water received from a fixed trade (default: 1).
    pub trade_water: u32,
    /// Invalid moves tolerated per turn before a forced rest (default: 5).
    pub max_invalid_moves: u32,
    /// Most food or water a trader hands over in one deal (default: 5).
    pub max_goods_per_trade: u32,
    /// Resource caps.
    pub caps: ResourceCaps,
}

impl Default for AgentRules {
    fn default() -> Self {
        Self {
            rest_energy: 5,
            rest_upkeep: 1,
            trade_cost: 3,
            trade_food: 1,
            trade_water: 1,
            max_invalid_moves: 5,
            max_goods_per_trade: 5,
            caps: ResourceCaps::default(),
        }
    }
}
