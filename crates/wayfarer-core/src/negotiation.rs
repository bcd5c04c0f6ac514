//! Negotiated trades between the policy and a trader.
//!
//! The policy opens with a counter-offer. The trader then either accepts or
//! reprices the requested goods at its personality margin, and the policy
//! answers that counter. Rounds are bounded; running out of rounds, a policy
//! failure, or a counter that merely repeats the player's offer all end the
//! negotiation without a deal.

use tracing::{debug, warn};
use wayfarer_agents::evaluate_offer;
use wayfarer_types::{AgentState, TradeOffer, TradeRequest, TradeResponse, TraderPersonality};

use crate::policy::Policy;

/// How a negotiation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiationOutcome {
    /// The agreed terms, or `None` if no deal was struck.
    pub agreed: Option<TradeOffer>,
    /// Policy calls made.
    pub rounds: u32,
}

impl NegotiationOutcome {
    const fn declined(rounds: u32) -> Self {
        Self {
            agreed: None,
            rounds,
        }
    }

    const fn agreed(offer: TradeOffer, rounds: u32) -> Self {
        Self {
            agreed: Some(offer),
            rounds,
        }
    }
}

/// Parameters of one negotiation.
#[derive(Debug, Clone, Copy)]
pub struct NegotiationContext {
    /// Current turn number.
    pub turn: u64,
    /// The agent's state when trading begins.
    pub agent: AgentState,
    /// The trader's personality.
    pub trader: TraderPersonality,
    /// Most food or water the trader hands over per deal.
    pub max_goods: u32,
    /// Maximum trader evaluations.
    pub max_rounds: u32,
}

/// Run a negotiation to completion. Nothing is applied to the agent here.
pub fn negotiate(policy: &mut dyn Policy, ctx: &NegotiationContext) -> NegotiationOutcome {
    let mut calls = 0_u32;

    let TradeResponse::CounterOffer(mut player_offer) = ask(policy, ctx, 0, None, &mut calls) else {
        debug!(turn = ctx.turn, "policy did not open the negotiation");
        return NegotiationOutcome::declined(calls);
    };

    for round in 0..ctx.max_rounds {
        let counter = match evaluate_offer(ctx.trader, &player_offer, &ctx.agent, ctx.max_goods) {
            TradeResponse::Accept => {
                debug!(turn = ctx.turn, round, offer = %player_offer, "trader accepted");
                return NegotiationOutcome::agreed(player_offer, calls);
            }
            TradeResponse::CounterOffer(counter) if counter != player_offer => counter,
            TradeResponse::CounterOffer(_) | TradeResponse::Reject => {
                debug!(turn = ctx.turn, round, "trader cannot improve on the offer");
                return NegotiationOutcome::declined(calls);
            }
        };
        debug!(turn = ctx.turn, round, offer = %counter, "trader countered");

        match ask(policy, ctx, round.saturating_add(1), Some(counter), &mut calls) {
            TradeResponse::Accept => return NegotiationOutcome::agreed(counter, calls),
            TradeResponse::Reject => return NegotiationOutcome::declined(calls),
            TradeResponse::CounterOffer(next) => player_offer = next,
        }
    }

    debug!(turn = ctx.turn, rounds = ctx.max_rounds, "negotiation ran out of rounds");
    NegotiationOutcome::declined(calls)
}

/// One policy call. Failures count as a reject.
fn ask(
    policy: &mut dyn Policy,
    ctx: &NegotiationContext,
    round: u32,
    current_offer: Option<TradeOffer>,
    calls: &mut u32,
) -> TradeResponse {
    *calls = calls.saturating_add(1);
    let request = TradeRequest {
        turn: ctx.turn,
        round,
        agent: ctx.agent,
        trader: ctx.trader,
        current_offer,
    };
    policy.decide_trade(&request).unwrap_or_else(|e| {
        warn!(turn = ctx.turn, round, error = %e, "trade policy failed, treating as reject");
        TradeResponse::Reject
    })
}
