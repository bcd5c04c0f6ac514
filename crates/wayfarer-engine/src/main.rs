//! Episode engine binary for the Wayfarer simulation.
//!
//! Wires together configuration, world generation, the decision policy and
//! the Observer API, then plays one episode to completion.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `wayfarer-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the decision policy
//! 4. Generate the world and place the agent
//! 5. Start the Observer API server
//! 6. Run the turn loop
//! 7. Print the episode report

mod error;
mod http_policy;
mod observer_callback;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;
use wayfarer_core::config::LoggingConfig;
use wayfarer_core::{
    Episode, GreedyEastPolicy, NoOpCallback, Policy, PolicyKind, RandomPolicy, TurnCallback,
    WayfarerConfig, run_episode,
};
use wayfarer_observer::state::AppState;

use crate::error::EngineError;
use crate::http_policy::HttpPolicy;
use crate::observer_callback::{ObserverCallback, publish_final};

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "wayfarer-config.yaml";

/// Application entry point for the episode engine.
///
/// # Errors
///
/// Returns an error if configuration, world generation, the observer or the
/// episode itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so remember whether the
    //    defaults were used and report it afterwards.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(from_file, "wayfarer-engine starting");
    info!(
        width = config.world.width,
        height = config.world.height,
        seed = config.world.seed,
        policy = ?config.decision.policy,
        max_turns = config.simulation.max_turns,
        "Configuration loaded"
    );

    // 3. Build the decision policy.
    let mut policy = build_policy(&config)?;

    // 4. Generate the world and place the agent.
    let mut episode = Episode::generate(&config)?;
    info!(
        episode_id = %episode.id(),
        start = %episode.start(),
        "Episode created"
    );

    // 5. Start the Observer API server.
    let observer_state = if config.observer.enabled {
        let app_state = Arc::new(AppState::new());
        let observer_handle =
            wayfarer_observer::spawn_observer(config.observer.port, Arc::clone(&app_state)).await?;
        info!(addr = %observer_handle.addr, "Observer API server started");
        Some(app_state)
    } else {
        None
    };
    let mut callback: Box<dyn TurnCallback> = match &observer_state {
        Some(app_state) => {
            let observer = ObserverCallback::new(Arc::clone(app_state), config.scoring);
            observer.publish_initial(&episode);
            Box::new(observer)
        }
        None => Box::new(NoOpCallback),
    };

    // 6. Run the turn loop.
    let result = run_episode(
        &mut episode,
        policy.as_mut(),
        config.simulation.max_turns,
        Duration::from_millis(config.simulation.turn_delay_ms),
        callback.as_mut(),
    )
    .await;
    if let Some(app_state) = &observer_state {
        publish_final(app_state, &episode, &config.scoring).await;
    }
    let result = result?;

    // 7. Report.
    let report = episode.report(&config.scoring);
    info!(
        end_reason = ?result.end_reason,
        turns_played = result.turns_played,
        score = report.score,
        "wayfarer-engine shutdown complete"
    );
    println!("{report}");
    println!("{}", episode.render_map());

    Ok(())
}

/// Load `wayfarer-config.yaml`, falling back to defaults when it is absent.
///
/// Returns the configuration and whether it came from the file.
fn load_config() -> Result<(WayfarerConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((WayfarerConfig::from_file(config_path)?, true))
    } else {
        let mut config = WayfarerConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_e| EnvFilter::new(&logging.level));
    if logging.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Build the policy named by `decision.policy`.
fn build_policy(config: &WayfarerConfig) -> Result<Box<dyn Policy>, EngineError> {
    let policy: Box<dyn Policy> = match config.decision.policy {
        PolicyKind::Http => {
            info!(
                url = config.decision.url,
                timeout_ms = config.decision.timeout_ms,
                "Using decision service"
            );
            Box::new(HttpPolicy::new(
                &config.decision.url,
                config.decision.timeout_ms,
            )?)
        }
        PolicyKind::GreedyEast => Box::new(GreedyEastPolicy::default()),
        PolicyKind::Random => Box::new(RandomPolicy::new(config.world.seed)),
    };
    Ok(policy)
}
