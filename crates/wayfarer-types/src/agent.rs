//! The agent's resource budget and position.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::grid::{Coordinate, Resource};

/// Mutable per-episode agent state.
///
/// All resources are unsigned; costs are applied with saturating
/// subtraction so a resource that would go negative lands on zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentState {
    /// Current position.
    pub position: Coordinate,
    /// Food remaining.
    pub food: u32,
    /// Water remaining.
    pub water: u32,
    /// Energy remaining.
    pub energy: u32,
    /// Gold held.
    pub gold: u32,
}

impl AgentState {
    /// Current amount of `resource`.
    pub const fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Food => self.food,
            Resource::Water => self.water,
            Resource::Energy => self.energy,
            Resource::Gold => self.gold,
        }
    }

    /// Mutable access to `resource`.
    pub const fn get_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Food => &mut self.food,
            Resource::Water => &mut self.water,
            Resource::Energy => &mut self.energy,
            Resource::Gold => &mut self.gold,
        }
    }

    /// True when food, water or energy has reached zero.
    pub const fn is_depleted(&self) -> bool {
        self.food == 0 || self.water == 0 || self.energy == 0
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "position={} food={} water={} energy={} gold={}",
            self.position, self.food, self.water, self.energy, self.gold
        )
    }
}
