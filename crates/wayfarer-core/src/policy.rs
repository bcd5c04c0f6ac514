//! Decision policy trait and built-in policies.
//!
//! Each turn the engine presents the policy with a [`DecisionRequest`] and
//! expects free-text action back. The [`Policy`] trait abstracts where that
//! answer comes from: an LLM decision service, a scripted bot, or a test
//! stub. Parsing the answer is the engine's job, not the policy's.
//!
//! Built-in policies:
//!
//! - [`FixedPolicy`] -- always the same text
//! - [`ScriptedPolicy`] -- a queue of answers, then a fallback
//! - [`RandomPolicy`] -- seeded random actions
//! - [`GreedyEastPolicy`] -- walks east over the cheapest visible tile

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use wayfarer_types::{
    Action, DecisionRequest, Direction, TradeOffer, TradeRequest, TradeResponse,
};

/// Errors a policy can report instead of an answer.
///
/// The engine never aborts on these: the agent rests and the cause is
/// recorded in the turn log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// The policy could not be reached.
    #[error("policy unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The policy did not answer within the deadline.
    #[error("policy timed out after {deadline_ms}ms")]
    Timeout {
        /// The deadline in milliseconds.
        deadline_ms: u64,
    },

    /// The policy answered with something that is not a decision.
    #[error("malformed policy response: {message}")]
    Malformed {
        /// Description of what was wrong.
        message: String,
    },
}

/// A source of agent decisions.
pub trait Policy {
    /// Choose an action for the current turn.
    ///
    /// `request.attempt` is non-zero when a previous answer in the same turn
    /// was an invalid move; `request.notifications` says why.
    fn decide(&mut self, request: &DecisionRequest) -> Result<String, PolicyError>;

    /// Respond to one round of a trade negotiation.
    ///
    /// With no `current_offer` the policy must open with a
    /// [`TradeResponse::CounterOffer`]; anything else ends the negotiation.
    /// The default walks away.
    fn decide_trade(&mut self, _request: &TradeRequest) -> Result<TradeResponse, PolicyError> {
        Ok(TradeResponse::Reject)
    }
}

// ---------------------------------------------------------------------------
// Fixed
// ---------------------------------------------------------------------------

/// Answers every request with the same text.
#[derive(Debug, Clone)]
pub struct FixedPolicy {
    text: String,
}

impl FixedPolicy {
    /// Create a policy that always answers `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Policy for FixedPolicy {
    fn decide(&mut self, _request: &DecisionRequest) -> Result<String, PolicyError> {
        Ok(self.text.clone())
    }
}

// ---------------------------------------------------------------------------
// Scripted
// ---------------------------------------------------------------------------

/// Plays a queue of answers, then repeats a fallback.
///
/// Every request is kept so tests can assert on what the engine asked.
#[derive(Debug, Clone)]
pub struct ScriptedPolicy {
    script: VecDeque<Result<String, PolicyError>>,
    fallback: String,
    trade_script: VecDeque<TradeResponse>,
    requests: Vec<DecisionRequest>,
    trade_requests: Vec<TradeRequest>,
}

impl ScriptedPolicy {
    /// Answer with `answers` in order, then `fallback` forever.
    pub fn new<I, S>(answers: I, fallback: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: answers.into_iter().map(|s| Ok(s.into())).collect(),
            fallback: fallback.into(),
            trade_script: VecDeque::new(),
            requests: Vec::new(),
            trade_requests: Vec::new(),
        }
    }

    /// Queue a failure after the answers queued so far.
    #[must_use]
    pub fn then_fail(mut self, error: PolicyError) -> Self {
        self.script.push_back(Err(error));
        self
    }

    /// Queue an answer after the entries queued so far.
    #[must_use]
    pub fn then_answer(mut self, answer: impl Into<String>) -> Self {
        self.script.push_back(Ok(answer.into()));
        self
    }

    /// Responses for successive negotiation rounds; `Reject` once exhausted.
    #[must_use]
    pub fn with_trade_responses(mut self, responses: impl IntoIterator<Item = TradeResponse>) -> Self {
        self.trade_script = responses.into_iter().collect();
        self
    }

    /// Every decision request received, oldest first.
    pub fn requests(&self) -> &[DecisionRequest] {
        &self.requests
    }

    /// Every trade request received, oldest first.
    pub fn trade_requests(&self) -> &[TradeRequest] {
        &self.trade_requests
    }
}

impl Policy for ScriptedPolicy {
    fn decide(&mut self, request: &DecisionRequest) -> Result<String, PolicyError> {
        self.requests.push(request.clone());
        self.script
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    fn decide_trade(&mut self, request: &TradeRequest) -> Result<TradeResponse, PolicyError> {
        self.trade_requests.push(request.clone());
        Ok(self.trade_script.pop_front().unwrap_or(TradeResponse::Reject))
    }
}

// ---------------------------------------------------------------------------
// Random
// ---------------------------------------------------------------------------

/// Picks uniformly among the eight moves, rest and trade.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    /// Create a policy seeded for reproducible runs.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn decide(&mut self, _request: &DecisionRequest) -> Result<String, PolicyError> {
        let mut choices: Vec<Action> = Direction::ALL.into_iter().map(Action::Move).collect();
        choices.push(Action::Rest);
        choices.push(Action::Trade);
        let action = choices.choose(&mut self.rng).copied().unwrap_or(Action::Rest);
        Ok(action.to_string())
    }
}

// ---------------------------------------------------------------------------
// Greedy east
// ---------------------------------------------------------------------------

/// Vision cells east of the agent, in tie-break order: E, NE, SE.
const EAST_CELLS: [(usize, usize, Direction); 3] = [
    (2, 1, Direction::East),
    (3, 1, Direction::NorthEast),
    (1, 1, Direction::SouthEast),
];

/// Vision cells beside the agent: N, S.
const SIDE_CELLS: [(usize, usize, Direction); 2] =
    [(3, 0, Direction::North), (1, 0, Direction::South)];

/// Heads east over the cheapest visible tile.
///
/// Rests when energy is low and trades when standing on a trader with spare
/// gold and a supply running short. On a retry it falls through to the next
/// candidate direction, and rests once it runs out.
#[derive(Debug, Clone)]
pub struct GreedyEastPolicy {
    /// Rest at or below this much energy.
    pub rest_below_energy: u32,
    /// Trade when food or water is below this.
    pub trade_below_supply: u32,
    /// Trade only with at least this much gold.
    pub min_trade_gold: u32,
    /// Highest gold price accepted in a negotiation.
    pub max_trade_price: u32,
}

impl Default for GreedyEastPolicy {
    fn default() -> Self {
        Self {
            rest_below_energy: 8,
            trade_below_supply: 20,
            min_trade_gold: 3,
            max_trade_price: 3,
        }
    }
}

impl GreedyEastPolicy {
    /// Candidate moves in preference order.
    fn candidates(request: &DecisionRequest) -> Vec<Direction> {
        let agent = request.agent;
        let escape_column = i64::from(agent.position.x).saturating_add(1) >= i64::from(request.map_width);
        if escape_column {
            return vec![Direction::East];
        }

        let mut east: Vec<(u32, Direction)> = EAST_CELLS
            .iter()
            .filter_map(|(row, col, direction)| {
                request
                    .vision
                    .cell(*row, *col)
                    .map(|view| (view.costs.total(), *direction))
            })
            .collect();
        // Stable sort keeps E, NE, SE order among equal costs.
        east.sort_by_key(|(cost, _)| *cost);

        let mut side: Vec<(u32, Direction)> = SIDE_CELLS
            .iter()
            .filter_map(|(row, col, direction)| {
                request
                    .vision
                    .cell(*row, *col)
                    .map(|view| (view.costs.total(), *direction))
            })
            .collect();
        side.sort_by_key(|(cost, _)| *cost);

        east.into_iter()
            .chain(side)
            .map(|(_, direction)| direction)
            .collect()
    }

    fn on_trader(request: &DecisionRequest) -> bool {
        request
            .vision
            .cell(2, 0)
            .is_some_and(wayfarer_types::TileView::has_trader)
    }
}

impl Policy for GreedyEastPolicy {
    fn decide(&mut self, request: &DecisionRequest) -> Result<String, PolicyError> {
        let agent = request.agent;
        let short_on_supplies = agent.food.min(agent.water) < self.trade_below_supply;
        if request.attempt == 0
            && Self::on_trader(request)
            && agent.gold >= self.min_trade_gold
            && short_on_supplies
        {
            return Ok(Action::Trade.to_string());
        }
        if agent.energy <= self.rest_below_energy {
            return Ok(Action::Rest.to_string());
        }

        let attempt = usize::try_from(request.attempt).unwrap_or(usize::MAX);
        let action = Self::candidates(request)
            .get(attempt)
            .copied()
            .map_or(Action::Rest, Action::Move);
        Ok(action.to_string())
    }

    fn decide_trade(&mut self, request: &TradeRequest) -> Result<TradeResponse, PolicyError> {
        let Some(offer) = request.current_offer else {
            return Ok(TradeResponse::CounterOffer(TradeOffer {
                food_to_player: 1,
                water_to_player: 1,
                gold_to_trader: 2,
                ..TradeOffer::default()
            }));
        };
        let affordable = offer.gold_to_trader <= request.agent.gold
            && offer.food_to_trader <= request.agent.food
            && offer.water_to_trader <= request.agent.water;
        if affordable && offer.gold_to_trader <= self.max_trade_price {
            Ok(TradeResponse::Accept)
        } else {
            Ok(TradeResponse::Reject)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wayfarer_types::{
        AgentState, Coordinate, TerrainCost, TerrainKind, Tile, TileView, TraderPersonality,
        VisionWindow,
    };

    use super::*;

    fn request(agent: AgentState, vision: VisionWindow) -> DecisionRequest {
        DecisionRequest {
            turn: 1,
            attempt: 0,
            agent,
            map_width: 10,
            map_height: 5,
            vision,
            memory: Vec::new(),
            memory_summary: String::new(),
            recent_turns: String::new(),
            notifications: Vec::new(),
        }
    }

    fn agent_at(x: i32, energy: u32) -> AgentState {
        AgentState {
            position: Coordinate::new(x, 2),
            food: 30,
            water: 30,
            energy,
            gold: 0,
        }
    }

    fn view(cost: u32) -> Option<TileView> {
        Some(TileView::of(
            &Tile::bare(TerrainKind::Plains),
            TerrainCost::new(cost, cost, cost),
        ))
    }

    #[test]
    fn fixed_policy_repeats_itself() {
        let mut policy = FixedPolicy::new("MOVE EAST");
        let req = request(agent_at(0, 10), VisionWindow::empty(Coordinate::new(0, 2)));
        assert_eq!(policy.decide(&req).unwrap(), "MOVE EAST");
        assert_eq!(policy.decide(&req).unwrap(), "MOVE EAST");
        assert_eq!(policy.decide_trade(&TradeRequest {
            turn: 1,
            round: 0,
            agent: req.agent,
            trader: TraderPersonality::Generous,
            current_offer: None,
        }).unwrap(), TradeResponse::Reject);
    }

    #[test]
    fn scripted_policy_plays_queue_then_fallback() {
        let mut policy = ScriptedPolicy::new(["MOVE NORTH"], "REST").then_fail(PolicyError::Timeout {
            deadline_ms: 5,
        });
        let req = request(agent_at(0, 10), VisionWindow::empty(Coordinate::new(0, 2)));
        assert_eq!(policy.decide(&req).unwrap(), "MOVE NORTH");
        assert!(policy.decide(&req).is_err());
        assert_eq!(policy.decide(&req).unwrap(), "REST");
        assert_eq!(policy.requests().len(), 3);
    }

    #[test]
    fn random_policy_is_reproducible() {
        let req = request(agent_at(0, 10), VisionWindow::empty(Coordinate::new(0, 2)));
        let mut a = RandomPolicy::new(9);
        let mut b = RandomPolicy::new(9);
        for _ in 0..20 {
            assert_eq!(a.decide(&req).unwrap(), b.decide(&req).unwrap());
        }
    }

    #[test]
    fn greedy_prefers_cheapest_eastward_tile() {
        let origin = Coordinate::new(0, 2);
        let mut vision = VisionWindow::empty(origin);
        vision.set(2, 1, view(4));
        vision.set(3, 1, view(1));
        vision.set(1, 1, view(2));
        let mut policy = GreedyEastPolicy::default();
        let mut req = request(agent_at(0, 30), vision);
        assert_eq!(policy.decide(&req).unwrap(), "MOVE NORTHEAST");
        req.attempt = 1;
        assert_eq!(policy.decide(&req).unwrap(), "MOVE SOUTHEAST");
        req.attempt = 7;
        assert_eq!(policy.decide(&req).unwrap(), "REST");
    }

    #[test]
    fn greedy_escapes_from_last_column() {
        let mut policy = GreedyEastPolicy::default();
        let req = request(agent_at(9, 30), VisionWindow::empty(Coordinate::new(9, 2)));
        assert_eq!(policy.decide(&req).unwrap(), "MOVE EAST");
    }

    #[test]
    fn greedy_rests_when_tired() {
        let mut policy = GreedyEastPolicy::default();
        let mut vision = VisionWindow::empty(Coordinate::new(0, 2));
        vision.set(2, 1, view(1));
        let req = request(agent_at(0, 3), vision);
        assert_eq!(policy.decide(&req).unwrap(), "REST");
    }

    #[test]
    fn greedy_trades_on_trader_when_short() {
        let origin = Coordinate::new(0, 2);
        let mut vision = VisionWindow::empty(origin);
        let tile = Tile::bare(TerrainKind::Plains).with_trader(TraderPersonality::Stingy);
        vision.set(2, 0, Some(TileView::of(&tile, TerrainCost::new(1, 1, 1))));
        let mut agent = agent_at(0, 30);
        agent.gold = 5;
        agent.food = 10;
        let mut policy = GreedyEastPolicy::default();
        assert_eq!(policy.decide(&request(agent, vision)).unwrap(), "TRADE");
    }

    #[test]
    fn greedy_negotiation() {
        let mut policy = GreedyEastPolicy::default();
        let mut trade = TradeRequest {
            turn: 1,
            round: 0,
            agent: AgentState {
                gold: 5,
                ..agent_at(0, 30)
            },
            trader: TraderPersonality::Stingy,
            current_offer: None,
        };
        assert!(matches!(
            policy.decide_trade(&trade).unwrap(),
            TradeResponse::CounterOffer(_)
        ));
        trade.current_offer = Some(TradeOffer {
            food_to_player: 1,
            water_to_player: 1,
            gold_to_trader: 3,
            ..TradeOffer::default()
        });
        assert_eq!(policy.decide_trade(&trade).unwrap(), TradeResponse::Accept);
        trade.current_offer = Some(TradeOffer {
            gold_to_trader: 8,
            ..TradeOffer::default()
        });
        assert_eq!(policy.decide_trade(&trade).unwrap(), TradeResponse::Reject);
    }
}
