//! The decision pipeline behind `/decide` and `/trade`.
//!
//! 1. Render the prompt from the request
//! 2. Call the primary backend, falling back to the escalation backend
//! 3. Turn the reply into an answer
//!
//! The whole pipeline runs under the decision deadline. Any failure still
//! produces an answer (`REST` or `Reject`) with the cause attached, so the
//! engine never loses a turn to the service.

use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, info, warn};
use wayfarer_types::{DecisionRequest, DecisionResponse, TradeRequest, TradeResponse};

use crate::error::RunnerError;
use crate::llm::LlmBackend;
use crate::parse;
use crate::prompt::{PromptEngine, RenderedPrompt};

/// Answer used whenever a decision cannot be obtained.
const FALLBACK_DECISION: &str = "REST";

/// Prompt rendering plus LLM backends.
pub struct DecisionService {
    prompt_engine: PromptEngine,
    primary_backend: LlmBackend,
    escalation_backend: Option<LlmBackend>,
    decision_timeout: Duration,
}

impl DecisionService {
    /// Create a new service.
    pub const fn new(
        prompt_engine: PromptEngine,
        primary_backend: LlmBackend,
        escalation_backend: Option<LlmBackend>,
        decision_timeout: Duration,
    ) -> Self {
        Self {
            prompt_engine,
            primary_backend,
            escalation_backend,
            decision_timeout,
        }
    }

    /// Answer a movement decision. Never fails; errors become `REST`.
    pub async fn decide(&self, request: &DecisionRequest) -> DecisionResponse {
        let turn = request.turn;
        match timeout(self.decision_timeout, self.decide_inner(request)).await {
            Ok(Ok(decision)) => {
                info!(turn, attempt = request.attempt, decision, "decision made");
                DecisionResponse {
                    decision,
                    fallback_reason: None,
                }
            }
            Ok(Err(e)) => {
                warn!(turn, error = %e, "decision pipeline failed, answering REST");
                fallback_decision(e.to_string())
            }
            Err(_elapsed) => {
                warn!(
                    turn,
                    timeout_ms = self.decision_timeout.as_millis(),
                    "decision deadline exceeded, answering REST"
                );
                fallback_decision(format!(
                    "deadline of {}ms exceeded",
                    self.decision_timeout.as_millis()
                ))
            }
        }
    }

    /// Answer one negotiation round. Never fails; errors become `Reject`.
    pub async fn decide_trade(&self, request: &TradeRequest) -> TradeResponse {
        let turn = request.turn;
        match timeout(self.decision_timeout, self.trade_inner(request)).await {
            Ok(Ok(response)) => {
                info!(turn, round = request.round, ?response, "trade response made");
                response
            }
            Ok(Err(e)) => {
                warn!(turn, round = request.round, error = %e, "trade pipeline failed, rejecting");
                TradeResponse::Reject
            }
            Err(_elapsed) => {
                warn!(turn, round = request.round, "trade deadline exceeded, rejecting");
                TradeResponse::Reject
            }
        }
    }

    async fn decide_inner(&self, request: &DecisionRequest) -> Result<String, RunnerError> {
        let prompt = self.prompt_engine.render_decision(request)?;
        let raw = self.complete(request.turn, &prompt).await?;
        Ok(parse::decision_text(&raw))
    }

    async fn trade_inner(&self, request: &TradeRequest) -> Result<TradeResponse, RunnerError> {
        let prompt = self.prompt_engine.render_trade(request)?;
        let raw = self.complete(request.turn, &prompt).await?;
        parse::trade_response(&raw)
    }

    /// Try the primary backend, then the escalation backend.
    async fn complete(&self, turn: u64, prompt: &RenderedPrompt) -> Result<String, RunnerError> {
        let start = Instant::now();
        match self.primary_backend.complete(prompt).await {
            Ok(reply) => {
                debug!(
                    turn,
                    backend = self.primary_backend.name(),
                    latency_ms = start.elapsed().as_millis(),
                    reply_len = reply.len(),
                    "primary backend responded"
                );
                Ok(reply)
            }
            Err(primary_err) => {
                let Some(escalation) = &self.escalation_backend else {
                    return Err(primary_err);
                };
                warn!(
                    turn,
                    backend = self.primary_backend.name(),
                    error = %primary_err,
                    "primary backend failed, trying escalation fallback"
                );
                let reply = escalation.complete(prompt).await?;
                debug!(
                    turn,
                    backend = escalation.name(),
                    latency_ms = start.elapsed().as_millis(),
                    "escalation backend responded"
                );
                Ok(reply)
            }
        }
    }
}

fn fallback_decision(reason: String) -> DecisionResponse {
    DecisionResponse {
        decision: FALLBACK_DECISION.to_owned(),
        fallback_reason: Some(reason),
    }
}
