//! Trading with the trader on the agent's tile.
//!
//! Two entry points feed the same exchange:
//!
//! 1. [`fixed_offer`] -- The standard deal: pay `trade_cost` gold for a
//!    fixed bundle of food and water.
//! 2. [`evaluate_offer`] -- The trader's side of a negotiated deal. Each
//!    [`TraderPersonality`] applies its own price margin.
//!
//! Either way the agreed terms go through [`apply_offer`], which checks that
//! the agent can pay and adds the received goods up to the resource caps.

use tracing::debug;
use wayfarer_types::{AgentState, Resource, TradeFailure, TradeOffer, TradeResponse, TraderPersonality};

use crate::config::{AgentRules, ResourceCaps};
use crate::vitals;

// ---------------------------------------------------------------------------
// Fixed exchange
// ---------------------------------------------------------------------------

/// The standard deal: `trade_cost` gold for `trade_food` food and
/// `trade_water` water.
pub const fn fixed_offer(rules: &AgentRules) -> TradeOffer {
    TradeOffer {
        food_to_player: rules.trade_food,
        water_to_player: rules.trade_water,
        gold_to_player: 0,
        food_to_trader: 0,
        water_to_trader: 0,
        gold_to_trader: rules.trade_cost,
    }
}

// ---------------------------------------------------------------------------
// Applying agreed terms
// ---------------------------------------------------------------------------

/// Execute `offer` against the agent.
///
/// Payment is checked before anything changes. Received goods are capped, so
/// the returned offer carries the amounts that were actually gained.
pub fn apply_offer(
    state: &mut AgentState,
    offer: &TradeOffer,
    caps: &ResourceCaps,
) -> Result<TradeOffer, TradeFailure> {
    if state.gold < offer.gold_to_trader {
        return Err(TradeFailure::InsufficientGold {
            available: state.gold,
            required: offer.gold_to_trader,
        });
    }
    if state.food < offer.food_to_trader || state.water < offer.water_to_trader {
        return Err(TradeFailure::InsufficientGoods);
    }

    vitals::spend(state, Resource::Gold, offer.gold_to_trader);
    vitals::spend(state, Resource::Food, offer.food_to_trader);
    vitals::spend(state, Resource::Water, offer.water_to_trader);

    let applied = TradeOffer {
        food_to_player: vitals::gain(state, Resource::Food, offer.food_to_player, caps),
        water_to_player: vitals::gain(state, Resource::Water, offer.water_to_player, caps),
        gold_to_player: vitals::gain(state, Resource::Gold, offer.gold_to_player, caps),
        ..*offer
    };
    debug!(offer = %applied, "trade applied");
    Ok(applied)
}

// ---------------------------------------------------------------------------
// Trader evaluation
// ---------------------------------------------------------------------------

/// Whether the agent holds everything `offer` asks it to give.
pub const fn can_afford(agent: &AgentState, offer: &TradeOffer) -> bool {
    agent.gold >= offer.gold_to_trader
        && agent.food >= offer.food_to_trader
        && agent.water >= offer.water_to_trader
}

/// The trader's answer to a player offer.
///
/// The trader accepts when it receives something, the agent can pay, and
/// `trader_value >= player_value * margin`. Otherwise it counters with the
/// requested food and water (at most `max_goods` each, one of each if none
/// were requested) priced at `ceil((food + water) * margin)` gold.
pub fn evaluate_offer(
    personality: TraderPersonality,
    offer: &TradeOffer,
    agent: &AgentState,
    max_goods: u32,
) -> TradeResponse {
    let margin = u64::from(personality.margin_percent());
    let receives = u64::from(offer.trader_value());
    let gives = u64::from(offer.player_value());

    if receives > 0
        && can_afford(agent, offer)
        && receives.saturating_mul(100) >= gives.saturating_mul(margin)
    {
        return TradeResponse::Accept;
    }
    TradeResponse::CounterOffer(counter_offer(personality, offer, max_goods))
}

/// The goods the player asked for, repriced at the trader's margin.
pub fn counter_offer(personality: TraderPersonality, offer: &TradeOffer, max_goods: u32) -> TradeOffer {
    let mut food = offer.food_to_player.min(max_goods);
    let mut water = offer.water_to_player.min(max_goods);
    if food == 0 && water == 0 {
        food = 1.min(max_goods);
        water = 1.min(max_goods);
    }
    let goods = u64::from(food.saturating_add(water));
    let priced = goods
        .saturating_mul(u64::from(personality.margin_percent()))
        .div_ceil(100);
    TradeOffer {
        food_to_player: food,
        water_to_player: water,
        gold_to_trader: u32::try_from(priced).unwrap_or(u32::MAX),
        ..TradeOffer::default()
    }
}
