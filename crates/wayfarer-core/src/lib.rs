//! Turn engine, policies and episode orchestration for the Wayfarer
//! simulation.
//!
//! This crate owns the per-turn state machine that moves one agent across a
//! world grid: vision sampling, memory ingestion, the policy call, action
//! resolution and terminal-state detection.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `wayfarer-config.yaml` into
//!   strongly-typed structs.
//! - [`episode`] -- The [`Episode`] value and its turn cycle.
//! - [`negotiation`] -- Bounded haggling between a policy and a trader.
//! - [`parse`] -- Free-text policy answers to typed actions.
//! - [`policy`] -- The [`Policy`] trait and offline implementations.
//! - [`runner`] -- The async loop that plays an episode to completion.
//! - [`stats`] -- Counters, score and the end-of-run report.
//!
//! [`Episode`]: episode::Episode
//! [`Policy`]: policy::Policy

pub mod config;
pub mod episode;
pub mod negotiation;
pub mod parse;
pub mod policy;
pub mod runner;
pub mod stats;

pub use config::{ConfigError, PolicyKind, WayfarerConfig};
pub use episode::{Episode, EpisodeError, EpisodeSettings, StepOutcome};
pub use parse::{ParseError, parse_action};
pub use policy::{
    FixedPolicy, GreedyEastPolicy, Policy, PolicyError, RandomPolicy, ScriptedPolicy,
};
pub use runner::{EndReason, EpisodeRunResult, NoOpCallback, TurnCallback, run_episode};
pub use stats::{EpisodeReport, EpisodeStats};
