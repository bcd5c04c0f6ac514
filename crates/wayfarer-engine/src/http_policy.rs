//! HTTP decision policy for the episode engine.
//!
//! [`HttpPolicy`] implements the [`Policy`] trait by posting each
//! [`DecisionRequest`] to the decision service's `/decide` endpoint and each
//! [`TradeRequest`] to `/trade`.
//!
//! # Sync/Async Bridge
//!
//! The [`Policy`] trait is synchronous, but `reqwest` is async. We use
//! [`tokio::task::block_in_place`] with the current runtime handle, so the
//! engine must run on the multi-threaded runtime.

use std::time::Duration;

use tracing::{debug, warn};
use wayfarer_core::{Policy, PolicyError};
use wayfarer_types::{DecisionRequest, DecisionResponse, TradeRequest, TradeResponse};

use crate::error::EngineError;

/// A policy backed by the decision service.
pub struct HttpPolicy {
    client: reqwest::Client,
    decide_url: String,
    trade_url: String,
    timeout_ms: u64,
}

impl HttpPolicy {
    /// Create a policy for the service at `base_url`.
    ///
    /// `timeout_ms` bounds every request; an expired request becomes
    /// [`PolicyError::Timeout`].
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| EngineError::Policy {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client,
            decide_url: format!("{base}/decide"),
            trade_url: format!("{base}/trade"),
            timeout_ms,
        })
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, PolicyError>
    where
        B: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PolicyError::Unavailable {
                message: format!("{url} answered {status}"),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| PolicyError::Malformed {
            message: format!("{url}: {e}"),
        })
    }

    fn transport_error(&self, error: &reqwest::Error) -> PolicyError {
        if error.is_timeout() {
            PolicyError::Timeout {
                deadline_ms: self.timeout_ms,
            }
        } else {
            PolicyError::Unavailable {
                message: error.to_string(),
            }
        }
    }

    async fn decide_async(&self, request: &DecisionRequest) -> Result<String, PolicyError> {
        let response: DecisionResponse = self.post(&self.decide_url, request).await?;
        if let Some(reason) = response.fallback_reason {
            warn!(turn = request.turn, reason = %reason, "decision service fell back");
            return Err(PolicyError::Unavailable { message: reason });
        }
        debug!(turn = request.turn, decision = %response.decision, "decision received");
        Ok(response.decision)
    }
}

/// Run `future` to completion from synchronous code inside the runtime.
fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, PolicyError> {
    let handle = tokio::runtime::Handle::try_current().map_err(|e| PolicyError::Unavailable {
        message: format!("no tokio runtime available: {e}"),
    })?;
    Ok(tokio::task::block_in_place(|| handle.block_on(future)))
}

impl std::fmt::Debug for HttpPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPolicy")
            .field("decide_url", &self.decide_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl Policy for HttpPolicy {
    fn decide(&mut self, request: &DecisionRequest) -> Result<String, PolicyError> {
        block_on(self.decide_async(request))?
    }

    fn decide_trade(&mut self, request: &TradeRequest) -> Result<TradeResponse, PolicyError> {
        block_on(self.post(&self.trade_url, request))?
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::routing::post;
    use axum::{Json, Router};
    use wayfarer_types::{
        AgentState, Coordinate, TradeOffer, TraderPersonality, VisionWindow,
    };

    use super::*;

    fn decision_request() -> DecisionRequest {
        let agent = AgentState {
            position: Coordinate::new(0, 2),
            food: 10,
            water: 10,
            energy: 10,
            gold: 5,
        };
        DecisionRequest {
            turn: 1,
            attempt: 0,
            agent,
            map_width: 5,
            map_height: 5,
            vision: VisionWindow::empty(agent.position),
            memory: Vec::new(),
            memory_summary: String::new(),
            recent_turns: String::new(),
            notifications: Vec::new(),
        }
    }

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn decision_text_comes_from_service() {
        let router = Router::new().route(
            "/decide",
            post(|Json(request): Json<DecisionRequest>| async move {
                Json(DecisionResponse {
                    decision: format!("MOVE EAST (turn {})", request.turn),
                    fallback_reason: None,
                })
            }),
        );
        let mut policy = HttpPolicy::new(&serve(router).await, 2_000).unwrap();
        let text = policy.decide(&decision_request()).unwrap();
        assert_eq!(text, "MOVE EAST (turn 1)");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn service_fallback_is_reported_as_unavailable() {
        let router = Router::new().route(
            "/decide",
            post(|| async {
                Json(DecisionResponse {
                    decision: String::from("REST"),
                    fallback_reason: Some(String::from("all backends failed")),
                })
            }),
        );
        let mut policy = HttpPolicy::new(&serve(router).await, 2_000).unwrap();
        let err = policy.decide(&decision_request()).unwrap_err();
        assert_eq!(
            err,
            PolicyError::Unavailable {
                message: String::from("all backends failed")
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn trade_response_is_decoded() {
        let offer = TradeOffer {
            food_to_player: 5,
            water_to_player: 5,
            gold_to_trader: 2,
            ..TradeOffer::default()
        };
        let router = Router::new().route(
            "/trade",
            post(move || async move { Json(TradeResponse::CounterOffer(offer)) }),
        );
        let mut policy = HttpPolicy::new(&serve(router).await, 2_000).unwrap();
        let request = TradeRequest {
            turn: 3,
            round: 0,
            agent: decision_request().agent,
            trader: TraderPersonality::Generous,
            current_offer: None,
        };
        let response = policy.decide_trade(&request).unwrap();
        assert_eq!(response, TradeResponse::CounterOffer(offer));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_service_is_unavailable() {
        let mut policy = HttpPolicy::new("http://127.0.0.1:9", 500).unwrap();
        let err = policy.decide(&decision_request()).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::Unavailable { .. } | PolicyError::Timeout { .. }
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_json_body_is_malformed() {
        let router = Router::new().route("/decide", post(|| async { "MOVE EAST" }));
        let mut policy = HttpPolicy::new(&serve(router).await, 2_000).unwrap();
        let err = policy.decide(&decision_request()).unwrap_err();
        assert!(matches!(err, PolicyError::Malformed { .. }));
    }
}
