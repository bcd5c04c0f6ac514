//! Agent-side rules for the Wayfarer simulation.
//!
//! This crate contains the logic layer for the agent -- everything that
//! operates on agent state without touching I/O or the world grid. It sits
//! between `wayfarer-types` (the data structures) and `wayfarer-core` (the
//! turn engine that orchestrates a run).
//!
//! # Modules
//!
//! - [`config`] -- Tunable rest, trade and retry rules ([`AgentRules`])
//! - [`error`] -- Invariant violations ([`AgentError`])
//! - [`history`] -- Bounded append-only turn log ([`TurnLog`])
//! - [`memory`] -- Spatial memory built from vision windows ([`SpatialMemory`])
//! - [`trade`] -- Fixed and negotiated exchanges with traders
//! - [`vitals`] -- Terrain costs, rest, capped gains

pub mod config;
pub mod error;
pub mod history;
pub mod memory;
pub mod trade;
pub mod vitals;

// Re-export primary types at crate root for convenience.
pub use config::{AgentRules, ResourceCaps};
pub use error::AgentError;
pub use history::{DEFAULT_HISTORY_CAPACITY, TurnLog};
pub use memory::{MemoryEntry, SpatialMemory};
pub use trade::{apply_offer, can_afford, counter_offer, evaluate_offer, fixed_offer};
