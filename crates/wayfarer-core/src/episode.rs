//! The turn engine: one [`Episode`] per run.
//!
//! An episode owns its world grid, agent state, spatial memory, terrain
//! catalog, turn log and statistics. Nothing is global, so independent
//! episodes can run side by side.
//!
//! # Turn cycle
//!
//! [`Episode::step`] runs one turn:
//!
//! 1. **Terminal check** -- depleted food, water or energy ends the episode,
//!    then a position past the eastern edge.
//! 2. **Vision** -- sample the window at the agent's position and ingest it
//!    into memory before deciding.
//! 3. **Decision** -- ask the policy; invalid moves are retried with a
//!    notice until the retry ceiling forces a rest.
//! 4. **Resolution** -- apply the action, record the turn, re-check for a
//!    terminal state.
//!
//! Policy misbehaviour never aborts a run: failures and unparseable answers
//! become a rest with the cause recorded. Only invariant violations (unknown
//! terrain, malformed vision) move the episode to `Errored`.

use std::collections::BTreeMap;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};
use wayfarer_agents::{
    AgentError, AgentRules, MemoryEntry, SpatialMemory, TurnLog, apply_offer, fixed_offer, vitals,
};
use wayfarer_types::{
    Action, AgentState, Coordinate, DecisionRequest, Direction, EpisodeId, EpisodeStatus,
    FallbackCause, ItemKind, TradeFailure, TurnOutcome, TurnRecord, VisionWindow,
};
use wayfarer_world::{
    MapMarkers, TerrainCatalog, VisionProfile, WorldError, WorldGrid, render_map,
};

use crate::config::{ScoringConfig, WayfarerConfig};
use crate::negotiation::{NegotiationContext, negotiate};
use crate::parse::parse_action;
use crate::policy::Policy;
use crate::stats::{EpisodeReport, EpisodeStats, score};

/// Errors that stop an episode.
#[derive(Debug, thiserror::Error)]
pub enum EpisodeError {
    /// The world violated an invariant.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Agent-side state violated an invariant.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// The starting position is not on the grid.
    #[error("start position {0} is outside the grid")]
    InvalidStart(Coordinate),
}

/// What one call to [`Episode::step`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A turn was resolved and recorded.
    Advanced(Box<TurnRecord>),
    /// The episode is over; no turn was played.
    Terminal(EpisodeStatus),
}

/// Everything about an episode except the world and the starting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeSettings {
    /// Rest, trade, retry and cap rules.
    pub rules: AgentRules,
    /// Terrain costs.
    pub catalog: TerrainCatalog,
    /// Vision mask.
    pub vision: VisionProfile,
    /// Turn records retained.
    pub history_capacity: usize,
    /// Past turns sent as recency context.
    pub recent_turns: usize,
    /// Remembered tiles sent with each request.
    pub summary_limit: usize,
    /// Negotiate trades instead of the fixed exchange.
    pub negotiated_trades: bool,
    /// Maximum negotiation rounds.
    pub negotiation_rounds: u32,
}

impl EpisodeSettings {
    /// Settings described by a loaded configuration.
    pub fn from_config(config: &WayfarerConfig) -> Self {
        Self {
            rules: config.to_rules(),
            catalog: config.catalog(),
            vision: config.agent.vision,
            history_capacity: config.memory.history_capacity,
            recent_turns: config.memory.recent_turns,
            summary_limit: config.memory.summary_limit,
            negotiated_trades: config.rules.negotiated_trades,
            negotiation_rounds: config.rules.negotiation_rounds,
        }
    }
}

impl Default for EpisodeSettings {
    fn default() -> Self {
        Self::from_config(&WayfarerConfig::default())
    }
}

/// How the decision phase ended.
enum Choice {
    /// The policy chose this action.
    Act(Action),
    /// The engine substituted a rest.
    Fallback(FallbackCause),
    /// The retry ceiling was reached.
    ForcedRest,
}

/// A single simulation run.
#[derive(Debug)]
pub struct Episode {
    id: EpisodeId,
    world: WorldGrid,
    agent: AgentState,
    start: Coordinate,
    memory: SpatialMemory,
    history: TurnLog,
    settings: EpisodeSettings,
    status: EpisodeStatus,
    stats: EpisodeStats,
    turn: u64,
}

impl Episode {
    /// Create an episode on an existing world.
    ///
    /// # Errors
    ///
    /// Fails if the start position is off the grid or any tile's terrain is
    /// missing from the catalog.
    pub fn new(
        world: WorldGrid,
        agent: AgentState,
        settings: EpisodeSettings,
    ) -> Result<Self, EpisodeError> {
        if !world.contains(agent.position) {
            return Err(EpisodeError::InvalidStart(agent.position));
        }
        for (_, tile) in world.tiles() {
            settings.catalog.cost(tile.terrain)?;
        }

        let id = EpisodeId::new();
        info!(
            episode_id = %id,
            width = world.width(),
            height = world.height(),
            start = %agent.position,
            "episode started"
        );
        Ok(Self {
            id,
            start: agent.position,
            history: TurnLog::new(settings.history_capacity),
            world,
            agent,
            memory: SpatialMemory::new(),
            settings,
            status: EpisodeStatus::Running,
            stats: EpisodeStats::default(),
            turn: 0,
        })
    }

    /// Generate a world from the configured seed and start an episode on it.
    ///
    /// Without a configured start row, one is drawn from the same seeded RNG.
    ///
    /// # Errors
    ///
    /// Fails on invalid generation parameters or an off-grid start.
    pub fn generate(config: &WayfarerConfig) -> Result<Self, EpisodeError> {
        let mut rng = StdRng::seed_from_u64(config.world.seed);
        let world = WorldGrid::generate(&config.generation_params(), &mut rng)?;
        let y = config.agent.start_y.unwrap_or_else(|| {
            let height = i32::try_from(world.height()).unwrap_or(i32::MAX);
            rng.random_range(0..height.max(1))
        });
        let agent = AgentState {
            position: Coordinate::new(config.agent.start_x, y),
            food: config.agent.food,
            water: config.agent.water,
            energy: config.agent.energy,
            gold: config.agent.gold,
        };
        Self::new(world, agent, EpisodeSettings::from_config(config))
    }

    // -----------------------------------------------------------------------
    // Turn cycle
    // -----------------------------------------------------------------------

    /// Run one turn.
    ///
    /// # Errors
    ///
    /// Returns an [`EpisodeError`] on an invariant violation. The episode is
    /// then `Errored` and its history stays available.
    pub fn step(&mut self, policy: &mut dyn Policy) -> Result<StepOutcome, EpisodeError> {
        if self.status.is_terminal() {
            return Ok(StepOutcome::Terminal(self.status.clone()));
        }
        if let Some(status) = self.terminal_status() {
            self.finish(status.clone());
            return Ok(StepOutcome::Terminal(status));
        }

        self.turn = self.turn.saturating_add(1);
        let position = self.agent.position;
        let before = self.agent;

        let window = self
            .world
            .vision(position, self.settings.vision, &self.settings.catalog)
            .map_err(|e| self.fail(e.into()))?;
        self.memory
            .ingest(position, &window)
            .map_err(|e| self.fail(e.into()))?;

        let (choice, decision, invalid_attempts) = self.decide(policy, &window);
        let (action, outcome, fallback) = match choice {
            Choice::Act(action) => {
                let outcome = self.resolve(action, policy).map_err(|e| self.fail(e))?;
                (action, outcome, None)
            }
            Choice::Fallback(cause) => {
                vitals::apply_rest(&mut self.agent, &self.settings.rules);
                (Action::Rest, TurnOutcome::Rested, Some(cause))
            }
            Choice::ForcedRest => {
                vitals::apply_rest(&mut self.agent, &self.settings.rules);
                (Action::Rest, TurnOutcome::ForcedRest, None)
            }
        };

        let record = TurnRecord {
            turn: self.turn,
            state: before,
            decision,
            action,
            outcome,
            invalid_attempts,
            fallback,
            state_after: self.agent,
            recorded_at: Utc::now(),
        };
        debug!(
            episode_id = %self.id,
            turn = self.turn,
            action = %record.action,
            state = %record.state_after,
            "turn resolved"
        );
        self.stats.record(&record);
        self.history.push(record.clone());

        if let Some(status) = self.terminal_status() {
            self.finish(status);
        }
        Ok(StepOutcome::Advanced(Box::new(record)))
    }

    /// Ask the policy until it names a valid action or the retry ceiling is
    /// hit. Returns the choice, the last raw answer and the invalid count.
    fn decide(&self, policy: &mut dyn Policy, window: &VisionWindow) -> (Choice, String, u32) {
        let mut notifications = Vec::new();
        let mut invalid = 0_u32;
        let mut last_text = String::new();

        loop {
            if invalid >= self.settings.rules.max_invalid_moves {
                warn!(
                    episode_id = %self.id,
                    turn = self.turn,
                    attempts = invalid,
                    "retry ceiling reached, forcing rest"
                );
                return (Choice::ForcedRest, last_text, invalid);
            }

            let request = self.decision_request(window, invalid, notifications.clone());
            let text = match policy.decide(&request) {
                Ok(text) => text,
                Err(e) => {
                    warn!(episode_id = %self.id, turn = self.turn, error = %e, "policy failed, resting");
                    let cause = FallbackCause::PolicyFailure(e.to_string());
                    return (Choice::Fallback(cause), last_text, invalid);
                }
            };
            last_text.clone_from(&text);

            match parse_action(&text) {
                Ok(Action::Move(direction)) => {
                    if let Some(reason) = self.invalid_move(direction) {
                        invalid = invalid.saturating_add(1);
                        warn!(
                            episode_id = %self.id,
                            turn = self.turn,
                            attempt = invalid,
                            %direction,
                            "invalid move"
                        );
                        notifications.push(reason);
                        continue;
                    }
                    return (Choice::Act(Action::Move(direction)), last_text, invalid);
                }
                Ok(action) => return (Choice::Act(action), last_text, invalid),
                Err(e) => {
                    warn!(episode_id = %self.id, turn = self.turn, error = %e, "unparseable decision, resting");
                    let cause = FallbackCause::Unparseable(e.to_string());
                    return (Choice::Fallback(cause), last_text, invalid);
                }
            }
        }
    }

    /// Why moving in `direction` is invalid, or `None` if it is allowed.
    fn invalid_move(&self, direction: Direction) -> Option<String> {
        let from = self.agent.position;
        match from.step(direction) {
            Some(target) if self.world.is_escape(target) || self.world.contains(target) => None,
            Some(target) => Some(format!(
                "MOVE {direction} from {from} leads to {target}, which is outside the map. Choose a different action."
            )),
            None => Some(format!(
                "MOVE {direction} from {from} is not possible. Choose a different action."
            )),
        }
    }

    fn decision_request(
        &self,
        window: &VisionWindow,
        attempt: u32,
        notifications: Vec<String>,
    ) -> DecisionRequest {
        let position = self.agent.position;
        DecisionRequest {
            turn: self.turn,
            attempt,
            agent: self.agent,
            map_width: self.world.width(),
            map_height: self.world.height(),
            vision: window.clone(),
            memory: self.memory.recall(position, self.settings.summary_limit),
            memory_summary: self.memory.summarize(position, self.settings.summary_limit),
            recent_turns: self.history.recent_context(self.settings.recent_turns),
            notifications,
        }
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    fn resolve(
        &mut self,
        action: Action,
        policy: &mut dyn Policy,
    ) -> Result<TurnOutcome, EpisodeError> {
        match action {
            Action::Move(direction) => self.resolve_move(direction),
            Action::Rest => {
                vitals::apply_rest(&mut self.agent, &self.settings.rules);
                Ok(TurnOutcome::Rested)
            }
            Action::Trade => Ok(self.resolve_trade(policy)),
        }
    }

    fn resolve_move(&mut self, direction: Direction) -> Result<TurnOutcome, EpisodeError> {
        let from = self.agent.position;
        let Some(to) = from.step(direction) else {
            return Err(WorldError::TileOutOfBounds(from).into());
        };

        if self.world.is_escape(to) {
            self.agent.position = to;
            return Ok(TurnOutcome::Escaped { from, to });
        }

        let Some(tile) = self.world.tile(to) else {
            return Err(WorldError::MissingTile(to).into());
        };
        let terrain = tile.terrain;
        let bonuses: Vec<ItemKind> = tile.bonus_items().map(|(kind, _)| kind).collect();
        let cost = self.settings.catalog.cost(terrain)?;

        vitals::apply_terrain_cost(&mut self.agent, cost);
        self.agent.position = to;

        let mut collected = Vec::new();
        for kind in bonuses {
            let (Some(bonus), Some(resource)) = (self.world.collect(to, kind), kind.resource())
            else {
                continue;
            };
            let gained = vitals::gain(&mut self.agent, resource, bonus.amount, &self.settings.rules.caps);
            collected.push((kind, gained));
        }

        Ok(TurnOutcome::Moved {
            from,
            to,
            terrain,
            collected,
        })
    }

    fn resolve_trade(&mut self, policy: &mut dyn Policy) -> TurnOutcome {
        let personality = self
            .world
            .tile(self.agent.position)
            .and_then(|tile| tile.trader);
        let Some(personality) = personality else {
            return self.trade_failed(TradeFailure::NoTrader);
        };

        let offer = if self.settings.negotiated_trades {
            let ctx = NegotiationContext {
                turn: self.turn,
                agent: self.agent,
                trader: personality,
                max_goods: self.settings.rules.max_goods_per_trade,
                max_rounds: self.settings.negotiation_rounds,
            };
            match negotiate(policy, &ctx).agreed {
                Some(offer) => offer,
                None => return self.trade_failed(TradeFailure::Declined),
            }
        } else {
            fixed_offer(&self.settings.rules)
        };

        match apply_offer(&mut self.agent, &offer, &self.settings.rules.caps) {
            Ok(applied) => {
                debug!(episode_id = %self.id, turn = self.turn, offer = %applied, "trade completed");
                TurnOutcome::Traded { offer: applied }
            }
            Err(reason) => self.trade_failed(reason),
        }
    }

    fn trade_failed(&self, reason: TradeFailure) -> TurnOutcome {
        warn!(episode_id = %self.id, turn = self.turn, %reason, "trade failed");
        TurnOutcome::TradeFailed { reason }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    fn terminal_status(&self) -> Option<EpisodeStatus> {
        if self.agent.is_depleted() {
            Some(EpisodeStatus::Depleted)
        } else if self.world.is_escape(self.agent.position) {
            Some(EpisodeStatus::Escaped)
        } else {
            None
        }
    }

    fn finish(&mut self, status: EpisodeStatus) {
        info!(
            episode_id = %self.id,
            turns = self.turn,
            %status,
            state = %self.agent,
            "episode ended"
        );
        self.status = status;
    }

    fn fail(&mut self, err: EpisodeError) -> EpisodeError {
        error!(episode_id = %self.id, turn = self.turn, error = %err, "invariant violated");
        self.status = EpisodeStatus::Errored(err.to_string());
        err
    }

    /// Clear spatial memory and turn history. The world, agent state and
    /// statistics are untouched.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.history.clear();
        debug!(episode_id = %self.id, "memory and history reset");
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// The episode identifier.
    pub const fn id(&self) -> EpisodeId {
        self.id
    }

    /// Current lifecycle status.
    pub const fn status(&self) -> &EpisodeStatus {
        &self.status
    }

    /// Current agent state.
    pub const fn agent(&self) -> &AgentState {
        &self.agent
    }

    /// Starting position.
    pub const fn start(&self) -> Coordinate {
        self.start
    }

    /// Turns played so far.
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Ground truth.
    pub const fn world(&self) -> &WorldGrid {
        &self.world
    }

    /// Retained turn records, oldest first.
    pub fn move_history(&self) -> Vec<&TurnRecord> {
        self.history.all().collect()
    }

    /// The turn log.
    pub const fn history(&self) -> &TurnLog {
        &self.history
    }

    /// The agent's memory.
    pub const fn memory(&self) -> &SpatialMemory {
        &self.memory
    }

    /// A copy of every remembered tile keyed by coordinate.
    pub fn memory_snapshot(&self) -> BTreeMap<Coordinate, MemoryEntry> {
        self.memory.snapshot()
    }

    /// Terrain costs in effect.
    pub const fn terrain_catalog(&self) -> &TerrainCatalog {
        &self.settings.catalog
    }

    /// Settings in effect.
    pub const fn settings(&self) -> &EpisodeSettings {
        &self.settings
    }

    /// Running counters.
    pub const fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    /// Text map with the start and agent marked.
    pub fn render_map(&self) -> String {
        render_map(
            &self.world,
            MapMarkers {
                start: Some(self.start),
                agent: Some(self.agent.position),
            },
        )
    }

    /// Summary of the run so far.
    pub fn report(&self, weights: &ScoringConfig) -> EpisodeReport {
        let distance_east = i64::from(self.agent.position.x).saturating_sub(i64::from(self.start.x));
        EpisodeReport {
            episode_id: self.id,
            outcome: self.status.clone(),
            total_turns: self.stats.turns,
            total_moves: self.stats.moves,
            start: self.start,
            end: self.agent.position,
            distance_east,
            final_state: self.agent,
            stats: self.stats,
            score: score(weights, &self.status, distance_east, &self.agent, &self.stats),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wayfarer_types::{Bonus, TerrainKind, Tile, TraderPersonality};

    use super::*;
    use crate::policy::{FixedPolicy, PolicyError, ScriptedPolicy};

    fn grid(width: u32, height: u32, special: &[(Coordinate, Tile)]) -> WorldGrid {
        let mut tiles = BTreeMap::new();
        for x in 0..i32::try_from(width).unwrap() {
            for y in 0..i32::try_from(height).unwrap() {
                tiles.insert(Coordinate::new(x, y), Tile::bare(TerrainKind::Plains));
            }
        }
        for (coordinate, tile) in special {
            tiles.insert(*coordinate, tile.clone());
        }
        WorldGrid::from_tiles(width, height, tiles).unwrap()
    }

    fn agent(x: i32, y: i32, supply: u32, gold: u32) -> AgentState {
        AgentState {
            position: Coordinate::new(x, y),
            food: supply,
            water: supply,
            energy: supply,
            gold,
        }
    }

    fn episode(world: WorldGrid, start: AgentState) -> Episode {
        Episode::new(world, start, EpisodeSettings::default()).unwrap()
    }

    fn advanced(outcome: StepOutcome) -> TurnRecord {
        let record = match outcome {
            StepOutcome::Advanced(record) => Some(*record),
            StepOutcome::Terminal(_) => None,
        };
        record.unwrap()
    }

    #[test]
    fn off_grid_start_is_rejected() {
        let result = Episode::new(grid(3, 3, &[]), agent(5, 0, 10, 0), EpisodeSettings::default());
        assert!(matches!(result, Err(EpisodeError::InvalidStart(_))));
    }

    #[test]
    fn move_charges_terrain_and_collects_bonus() {
        let desert = Tile::bare(TerrainKind::Desert).with_bonus(ItemKind::FoodBonus, Bonus::once(5));
        let mut ep = episode(
            grid(5, 3, &[(Coordinate::new(1, 1), desert)]),
            agent(0, 1, 20, 0),
        );
        let record = advanced(ep.step(&mut FixedPolicy::new("MOVE EAST")).unwrap());
        // Desert costs 3/3/4, bonus adds 5 food afterwards.
        assert_eq!(ep.agent().position, Coordinate::new(1, 1));
        assert_eq!((ep.agent().food, ep.agent().water, ep.agent().energy), (22, 16, 17));
        assert!(matches!(record.outcome, TurnOutcome::Moved { ref collected, .. } if collected == &vec![(ItemKind::FoodBonus, 5)]));
        assert!(!ep.world().tile(Coordinate::new(1, 1)).unwrap().has(ItemKind::FoodBonus));
    }

    #[test]
    fn repeating_bonus_survives_collection() {
        let spring = Tile::bare(TerrainKind::Plains).with_bonus(ItemKind::WaterBonus, Bonus::repeating(5));
        let mut ep = episode(
            grid(5, 3, &[(Coordinate::new(1, 1), spring)]),
            agent(0, 1, 20, 0),
        );
        let mut policy = ScriptedPolicy::new(["MOVE EAST", "MOVE WEST", "MOVE EAST"], "REST");
        for _ in 0..3 {
            ep.step(&mut policy).unwrap();
        }
        assert!(ep.world().tile(Coordinate::new(1, 1)).unwrap().has(ItemKind::WaterBonus));
        assert_eq!(ep.stats().water_collected, 10);
    }

    #[test]
    fn memory_is_ingested_before_the_policy_is_asked() {
        let mut ep = episode(grid(5, 5, &[]), agent(0, 2, 20, 0));
        let mut policy = ScriptedPolicy::new(["REST"], "REST");
        ep.step(&mut policy).unwrap();
        assert_eq!(ep.memory().len(), 15);
        let first = policy.requests().first().unwrap();
        assert_eq!(first.memory.len(), 15);
    }

    #[test]
    fn policy_failure_becomes_recorded_rest() {
        let mut ep = episode(grid(5, 3, &[]), agent(0, 1, 20, 0));
        let mut policy = ScriptedPolicy::new(Vec::<String>::new(), "REST").then_fail(PolicyError::Timeout {
            deadline_ms: 10,
        });
        let record = advanced(ep.step(&mut policy).unwrap());
        assert_eq!(record.action, Action::Rest);
        assert!(matches!(record.fallback, Some(FallbackCause::PolicyFailure(_))));
        assert_eq!(ep.status(), &EpisodeStatus::Running);
    }

    #[test]
    fn partial_move_text_rests_without_retry() {
        let mut ep = episode(grid(5, 3, &[]), agent(0, 1, 20, 0));
        let mut policy = FixedPolicy::new("MOVE");
        let record = advanced(ep.step(&mut policy).unwrap());
        assert_eq!(record.outcome, TurnOutcome::Rested);
        assert_eq!(record.invalid_attempts, 0);
        assert!(matches!(record.fallback, Some(FallbackCause::Unparseable(_))));
    }

    #[test]
    fn invalid_moves_are_retried_with_notices() {
        let mut ep = episode(grid(5, 3, &[]), agent(0, 1, 20, 0));
        let mut policy = ScriptedPolicy::new(["MOVE WEST", "MOVE EAST"], "REST");
        let record = advanced(ep.step(&mut policy).unwrap());
        assert_eq!(record.action, Action::Move(Direction::East));
        assert_eq!(record.invalid_attempts, 1);
        let retry = policy.requests().get(1).unwrap();
        assert_eq!(retry.attempt, 1);
        assert_eq!(retry.notifications.len(), 1);
    }

    #[test]
    fn fifth_invalid_move_forces_rest_without_sixth_call() {
        let mut ep = episode(grid(5, 3, &[]), agent(0, 1, 20, 0));
        let mut counting = ScriptedPolicy::new(Vec::<String>::new(), "MOVE WEST");
        let record = advanced(ep.step(&mut counting).unwrap());
        assert_eq!(counting.requests().len(), 5);
        assert_eq!(record.outcome, TurnOutcome::ForcedRest);
        assert_eq!(record.invalid_attempts, 5);
        assert_eq!(ep.agent().position, Coordinate::new(0, 1));
        // Same behaviour on the next turn.
        let record = advanced(ep.step(&mut FixedPolicy::new("MOVE WEST")).unwrap());
        assert_eq!(record.outcome, TurnOutcome::ForcedRest);
    }

    #[test]
    fn trade_without_enough_gold_is_a_noop_turn() {
        let market = Tile::bare(TerrainKind::Plains).with_trader(TraderPersonality::Generous);
        let mut ep = episode(
            grid(5, 3, &[(Coordinate::new(0, 1), market)]),
            agent(0, 1, 20, 2),
        );
        let before = *ep.agent();
        let record = advanced(ep.step(&mut FixedPolicy::new("TRADE")).unwrap());
        assert_eq!(
            record.outcome,
            TurnOutcome::TradeFailed {
                reason: TradeFailure::InsufficientGold {
                    available: 2,
                    required: 3
                }
            }
        );
        assert_eq!(*ep.agent(), before);
        assert_eq!(ep.turn(), 1);
    }

    #[test]
    fn trade_without_trader_fails() {
        let mut ep = episode(grid(5, 3, &[]), agent(0, 1, 20, 10));
        let record = advanced(ep.step(&mut FixedPolicy::new("TRADE")).unwrap());
        assert_eq!(
            record.outcome,
            TurnOutcome::TradeFailed {
                reason: TradeFailure::NoTrader
            }
        );
    }

    #[test]
    fn fixed_trade_exchanges_gold() {
        let market = Tile::bare(TerrainKind::Plains).with_trader(TraderPersonality::Stingy);
        let mut ep = episode(
            grid(5, 3, &[(Coordinate::new(0, 1), market)]),
            agent(0, 1, 20, 5),
        );
        ep.step(&mut FixedPolicy::new("TRADE")).unwrap();
        assert_eq!((ep.agent().gold, ep.agent().food, ep.agent().water), (2, 21, 21));
        assert_eq!(ep.stats().trades, 1);
    }

    #[test]
    fn depletion_is_detected_after_resolution() {
        let mountain = Tile::bare(TerrainKind::Mountain);
        let mut ep = episode(
            grid(5, 3, &[(Coordinate::new(1, 1), mountain)]),
            agent(0, 1, 3, 0),
        );
        advanced(ep.step(&mut FixedPolicy::new("MOVE EAST")).unwrap());
        assert_eq!(ep.status(), &EpisodeStatus::Depleted);
        assert_eq!(
            ep.step(&mut FixedPolicy::new("REST")).unwrap(),
            StepOutcome::Terminal(EpisodeStatus::Depleted)
        );
        assert_eq!(ep.move_history().len(), 1);
    }

    #[test]
    fn reset_clears_memory_and_history_only() {
        let mut ep = episode(grid(5, 3, &[]), agent(0, 1, 20, 0));
        ep.step(&mut FixedPolicy::new("MOVE EAST")).unwrap();
        ep.reset();
        assert!(ep.memory().is_empty());
        assert!(ep.move_history().is_empty());
        assert_eq!(ep.agent().position, Coordinate::new(1, 1));
        assert_eq!(ep.stats().turns, 1);
    }

    #[test]
    fn generated_episodes_are_reproducible() {
        let config = WayfarerConfig::default();
        let a = Episode::generate(&config).unwrap();
        let b = Episode::generate(&config).unwrap();
        assert_eq!(a.world(), b.world());
        assert_eq!(a.start(), b.start());
    }
}
