//! HTTP surface of the decision service.
//!
//! - `POST /decide` -- `DecisionRequest` in, `DecisionResponse` out
//! - `POST /trade` -- `TradeRequest` in, `TradeResponse` out
//! - `GET /health` -- liveness probe

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use wayfarer_types::{DecisionRequest, DecisionResponse, TradeRequest, TradeResponse};

use crate::error::RunnerError;
use crate::service::DecisionService;

/// Build the router.
pub fn build_router(service: Arc<DecisionService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/decide", post(decide))
        .route("/trade", post(trade))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Bind `bind_addr` and serve until the process exits.
pub async fn serve(bind_addr: &str, service: Arc<DecisionService>) -> Result<(), RunnerError> {
    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = bind_addr, "decision service listening");
    axum::serve(listener, build_router(service)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn decide(
    State(service): State<Arc<DecisionService>>,
    Json(request): Json<DecisionRequest>,
) -> Json<DecisionResponse> {
    Json(service.decide(&request).await)
}

async fn trade(
    State(service): State<Arc<DecisionService>>,
    Json(request): Json<TradeRequest>,
) -> Json<TradeResponse> {
    Json(service.decide_trade(&request).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use wayfarer_types::{AgentState, Coordinate, TraderPersonality, VisionWindow};

    use super::*;
    use crate::config::{BackendType, LlmBackendConfig, SamplingConfig};
    use crate::llm::create_backend;
    use crate::prompt::PromptEngine;

    /// A service whose backend points at a closed local port.
    fn unreachable_service(tag: &str) -> Arc<DecisionService> {
        let dir = std::env::temp_dir().join(format!(
            "wayfarer_server_{tag}_{}_{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        for file in ["system.j2", "decision.j2", "trade.j2"] {
            std::fs::write(dir.join(file), "Turn {{ turn }}").unwrap();
        }
        let engine = PromptEngine::new(dir.to_str().unwrap()).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        let backend = create_backend(
            &LlmBackendConfig {
                backend_type: BackendType::OpenAi,
                api_url: String::from("http://127.0.0.1:9"),
                api_key: String::from("unused"),
                model: String::from("unused"),
            },
            SamplingConfig::default(),
        );
        Arc::new(DecisionService::new(
            engine,
            backend,
            None,
            Duration::from_secs(5),
        ))
    }

    fn agent() -> AgentState {
        AgentState {
            position: Coordinate::new(0, 0),
            food: 10,
            water: 10,
            energy: 10,
            gold: 3,
        }
    }

    async fn post_json(router: Router, uri: &str, body: String) -> serde_json::Value {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let router = build_router(unreachable_service("health"));
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn backend_failure_answers_rest() {
        let router = build_router(unreachable_service("decide"));
        let request = DecisionRequest {
            turn: 1,
            attempt: 0,
            agent: agent(),
            map_width: 5,
            map_height: 1,
            vision: VisionWindow::empty(Coordinate::new(0, 0)),
            memory: Vec::new(),
            memory_summary: String::new(),
            recent_turns: String::new(),
            notifications: Vec::new(),
        };
        let json = post_json(router, "/decide", serde_json::to_string(&request).unwrap()).await;
        assert_eq!(json["decision"], "REST");
        assert!(json["fallback_reason"].is_string());
    }

    #[tokio::test]
    async fn backend_failure_rejects_trade() {
        let router = build_router(unreachable_service("trade"));
        let request = TradeRequest {
            turn: 1,
            round: 0,
            agent: agent(),
            trader: TraderPersonality::Generous,
            current_offer: None,
        };
        let json = post_json(router, "/trade", serde_json::to_string(&request).unwrap()).await;
        assert_eq!(json["response"], "Reject");
    }
}
