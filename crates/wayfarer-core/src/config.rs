//! Configuration loading and typed config structures for the Wayfarer simulation.
//!
//! The canonical configuration lives in `wayfarer-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file. Every field has a
//! default, so an empty document (or no file at all) yields the reference
//! game.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use wayfarer_agents::{AgentRules, ResourceCaps};
use wayfarer_types::{TerrainCost, TerrainKind};
use wayfarer_world::{GenerationParams, TerrainCatalog, VisionProfile};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `wayfarer-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WayfarerConfig {
    /// Grid size, seed and item placement.
    #[serde(default)]
    pub world: WorldConfig,

    /// Starting position, resources and vision profile.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Rest, trade, retry and cap rules.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Terrain cost overrides.
    #[serde(default)]
    pub terrain: TerrainConfig,

    /// Memory and history sizing.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Episode bounds and pacing.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Score weights.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Which policy decides, and where to reach it.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Observer HTTP server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WayfarerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `WAYFARER_DECISION_URL` overrides `decision.url`
    /// - `WAYFARER_SEED` overrides `world.seed`
    /// - `WAYFARER_OBSERVER_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides are
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply `WAYFARER_*` environment overrides. Unparseable numeric values
    /// are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("WAYFARER_DECISION_URL") {
            self.decision.url = val;
        }
        if let Some(seed) = std::env::var("WAYFARER_SEED")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.world.seed = seed;
        }
        if let Some(port) = std::env::var("WAYFARER_OBSERVER_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.observer.port = port;
        }
    }

    /// The agent rules this configuration describes.
    pub const fn to_rules(&self) -> AgentRules {
        AgentRules {
            rest_energy: self.rules.rest_energy,
            rest_upkeep: self.rules.rest_upkeep,
            trade_cost: self.rules.trade_cost,
            trade_food: self.rules.trade_food,
            trade_water: self.rules.trade_water,
            max_invalid_moves: self.rules.max_invalid_moves,
            max_goods_per_trade: self.rules.max_goods_per_trade,
            caps: ResourceCaps {
                food: self.rules.max_food,
                water: self.rules.max_water,
                energy: self.rules.max_energy,
                gold: self.rules.max_gold,
            },
        }
    }

    /// The terrain catalog: reference costs with configured overrides.
    pub fn catalog(&self) -> TerrainCatalog {
        TerrainCatalog::with_overrides(&self.terrain.costs)
    }

    /// World generation parameters.
    pub const fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            width: self.world.width,
            height: self.world.height,
            bonus_probability: self.world.bonus_probability,
            repeating_probability: self.world.repeating_probability,
            bonus_amount: self.world.bonus_amount,
        }
    }
}

/// World generation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Columns; the agent escapes at `x >= width`.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Rows.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Chance that a tile carries an item.
    #[serde(default = "default_bonus_probability")]
    pub bonus_probability: f64,

    /// Chance that a food or water bonus is repeating.
    #[serde(default = "default_repeating_probability")]
    pub repeating_probability: f64,

    /// Amount granted by each bonus.
    #[serde(default = "default_bonus_amount")]
    pub bonus_amount: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: default_seed(),
            bonus_probability: default_bonus_probability(),
            repeating_probability: default_repeating_probability(),
            bonus_amount: default_bonus_amount(),
        }
    }
}

/// Agent starting conditions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentConfig {
    /// Starting column.
    #[serde(default)]
    pub start_x: i32,

    /// Starting row. When absent a row is drawn from the world seed.
    #[serde(default)]
    pub start_y: Option<i32>,

    /// Starting food.
    #[serde(default = "default_starting_supply")]
    pub food: u32,

    /// Starting water.
    #[serde(default = "default_starting_supply")]
    pub water: u32,

    /// Starting energy.
    #[serde(default = "default_starting_supply")]
    pub energy: u32,

    /// Starting gold.
    #[serde(default = "default_starting_gold")]
    pub gold: u32,

    /// Which vision cells the agent can see.
    #[serde(default)]
    pub vision: VisionProfile,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            start_x: 0,
            start_y: None,
            food: default_starting_supply(),
            water: default_starting_supply(),
            energy: default_starting_supply(),
            gold: default_starting_gold(),
            vision: VisionProfile::default(),
        }
    }
}

/// Rest, trade, retry and cap rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RulesConfig {
    /// Energy recovered by resting.
    #[serde(default = "default_rest_energy")]
    pub rest_energy: u32,

    /// Food and water consumed by resting.
    #[serde(default = "default_rest_upkeep")]
    pub rest_upkeep: u32,

    /// Gold paid for a fixed trade.
    #[serde(default = "default_trade_cost")]
    pub trade_cost: u32,

    /// Food received from a fixed trade.
    #[serde(default = "default_trade_goods")]
    pub trade_food: u32,

    /// Water received from a fixed trade.
    #[serde(default = "default_trade_goods")]
    pub trade_water: u32,

    /// Invalid moves tolerated per turn before a forced rest.
    #[serde(default = "default_max_invalid_moves")]
    pub max_invalid_moves: u32,

    /// Whether trades are negotiated with the trader instead of fixed.
    #[serde(default)]
    pub negotiated_trades: bool,

    /// Maximum negotiation rounds.
    #[serde(default = "default_negotiation_rounds")]
    pub negotiation_rounds: u32,

    /// Most food or water a trader hands over in one deal.
    #[serde(default = "default_max_goods_per_trade")]
    pub max_goods_per_trade: u32,

    /// Food cap.
    #[serde(default = "default_cap")]
    pub max_food: u32,

    /// Water cap.
    #[serde(default = "default_cap")]
    pub max_water: u32,

    /// Energy cap.
    #[serde(default = "default_cap")]
    pub max_energy: u32,

    /// Gold cap.
    #[serde(default = "default_cap")]
    pub max_gold: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            rest_energy: default_rest_energy(),
            rest_upkeep: default_rest_upkeep(),
            trade_cost: default_trade_cost(),
            trade_food: default_trade_goods(),
            trade_water: default_trade_goods(),
            max_invalid_moves: default_max_invalid_moves(),
            negotiated_trades: false,
            negotiation_rounds: default_negotiation_rounds(),
            max_goods_per_trade: default_max_goods_per_trade(),
            max_food: default_cap(),
            max_water: default_cap(),
            max_energy: default_cap(),
            max_gold: default_cap(),
        }
    }
}

/// Terrain cost overrides, merged over the reference table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TerrainConfig {
    /// Costs keyed by terrain name (`Plains`, `Forest`, ...).
    #[serde(default)]
    pub costs: BTreeMap<TerrainKind, TerrainCost>,
}

/// Memory and history sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoryConfig {
    /// Turn records retained in the history ring buffer.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Past turns included as recency context in each decision request.
    #[serde(default = "default_recent_turns")]
    pub recent_turns: usize,

    /// Remembered tiles included in each decision request.
    #[serde(default = "default_summary_limit")]
    pub summary_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            recent_turns: default_recent_turns(),
            summary_limit: default_summary_limit(),
        }
    }
}

/// Episode bounds and pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Turn limit; the runner stops here if the episode is still running.
    #[serde(default = "default_max_turns")]
    pub max_turns: u64,

    /// Real-time pause between turns, in milliseconds.
    #[serde(default)]
    pub turn_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            turn_delay_ms: 0,
        }
    }
}

/// Weights for [`crate::stats::score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScoringConfig {
    /// Flat bonus for escaping.
    #[serde(default = "default_escape_bonus")]
    pub escape_bonus: i64,

    /// Points per column travelled east.
    #[serde(default = "default_distance_weight")]
    pub distance_weight: i64,

    /// Points per remaining unit of food, water and energy.
    #[serde(default = "default_unit_weight")]
    pub resource_weight: i64,

    /// Points per remaining gold.
    #[serde(default = "default_unit_weight")]
    pub gold_weight: i64,

    /// Points lost per invalid move.
    #[serde(default = "default_invalid_move_penalty")]
    pub invalid_move_penalty: i64,

    /// Points lost per turn played.
    #[serde(default = "default_unit_weight")]
    pub turn_penalty: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            escape_bonus: default_escape_bonus(),
            distance_weight: default_distance_weight(),
            resource_weight: default_unit_weight(),
            gold_weight: default_unit_weight(),
            invalid_move_penalty: default_invalid_move_penalty(),
            turn_penalty: default_unit_weight(),
        }
    }
}

/// Which policy drives the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Ask the decision service over HTTP.
    #[default]
    Http,
    /// The built-in greedy eastward walker.
    GreedyEast,
    /// Seeded random actions.
    Random,
}

/// Decision policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecisionConfig {
    /// Which policy to use.
    #[serde(default)]
    pub policy: PolicyKind,

    /// Base URL of the decision service.
    #[serde(default = "default_decision_url")]
    pub url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_decision_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            url: default_decision_url(),
            timeout_ms: default_decision_timeout_ms(),
        }
    }
}

/// Observer server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether to start the observer.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Port to bind on all interfaces.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_observer_port(),
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_width() -> u32 {
    20
}

const fn default_height() -> u32 {
    5
}

const fn default_seed() -> u64 {
    42
}

const fn default_bonus_probability() -> f64 {
    0.3
}

const fn default_repeating_probability() -> f64 {
    0.2
}

const fn default_bonus_amount() -> u32 {
    5
}

const fn default_starting_supply() -> u32 {
    50
}

const fn default_starting_gold() -> u32 {
    30
}

const fn default_rest_energy() -> u32 {
    5
}

const fn default_rest_upkeep() -> u32 {
    1
}

const fn default_trade_cost() -> u32 {
    3
}

const fn default_trade_goods() -> u32 {
    1
}

const fn default_max_invalid_moves() -> u32 {
    5
}

const fn default_negotiation_rounds() -> u32 {
    3
}

const fn default_max_goods_per_trade() -> u32 {
    5
}

const fn default_cap() -> u32 {
    50
}

const fn default_history_capacity() -> usize {
    1024
}

const fn default_recent_turns() -> usize {
    5
}

const fn default_summary_limit() -> usize {
    50
}

const fn default_max_turns() -> u64 {
    200
}

const fn default_escape_bonus() -> i64 {
    100
}

const fn default_distance_weight() -> i64 {
    10
}

const fn default_unit_weight() -> i64 {
    1
}

const fn default_invalid_move_penalty() -> i64 {
    2
}

fn default_decision_url() -> String {
    "http://localhost:8080".to_owned()
}

const fn default_decision_timeout_ms() -> u64 {
    30_000
}

const fn default_true() -> bool {
    true
}

const fn default_observer_port() -> u16 {
    8090
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "pretty".to_owned()
}
