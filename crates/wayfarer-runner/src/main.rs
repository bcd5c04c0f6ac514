//! Decision service entry point for the Wayfarer simulation.
//!
//! The engine posts a `DecisionRequest` for every turn (and a
//! `TradeRequest` for every negotiation round). The service renders a
//! prompt, asks an LLM backend, and answers with the model's choice.
//!
//! # Architecture
//!
//! ```text
//! HTTP (request) --> Prompt Engine --> LLM Backend --> Reply Parser --> HTTP (answer)
//! ```
//!
//! If the LLM fails or times out, the service answers `REST` (or `Reject`)
//! and names the cause, so the agent never misses a turn.

mod config;
mod error;
mod llm;
mod parse;
mod prompt;
mod server;
mod service;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::RunnerConfig;
use crate::llm::create_backend;
use crate::prompt::PromptEngine;
use crate::service::DecisionService;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// sets up LLM backends and prompt templates, then serves HTTP.
///
/// # Errors
///
/// Returns an error if initialization or the server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_e| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("wayfarer-runner starting");

    let config = RunnerConfig::from_env()?;
    info!(
        bind_addr = config.bind_addr,
        templates_dir = config.templates_dir,
        decision_timeout_ms = config.decision_timeout.as_millis(),
        max_tokens = config.sampling.max_tokens,
        "configuration loaded"
    );

    let prompt_engine = PromptEngine::new(&config.templates_dir)?;
    info!(templates_dir = config.templates_dir, "prompt templates loaded");

    let primary = create_backend(&config.primary, config.sampling);
    info!(
        backend = primary.name(),
        model = config.primary.model,
        "primary LLM backend configured"
    );

    let escalation = config.escalation.as_ref().map(|cfg| {
        let backend = create_backend(cfg, config.sampling);
        info!(
            backend = backend.name(),
            model = cfg.model,
            "escalation LLM backend configured"
        );
        backend
    });

    let service = Arc::new(DecisionService::new(
        prompt_engine,
        primary,
        escalation,
        config.decision_timeout,
    ));

    server::serve(&config.bind_addr, service).await?;
    Ok(())
}
