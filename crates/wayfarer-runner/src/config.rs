//! Decision service settings, read from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `RUNNER_BIND_ADDR` | `0.0.0.0:8080` | listen address |
//! | `LLM_DEFAULT_BACKEND` | required | `openai`, `deepseek`, `ollama`, `anthropic` |
//! | `LLM_DEFAULT_API_URL` | required | base URL of the primary backend |
//! | `LLM_DEFAULT_API_KEY` | required | its API key |
//! | `LLM_DEFAULT_MODEL` | required | its model name |
//! | `LLM_ESCALATION_*` | unset | same four keys for a fallback backend |
//! | `DECISION_TIMEOUT_MS` | `25000` | deadline for one answer, fallback included |
//! | `TEMPLATES_DIR` | `templates` | prompt template directory |
//! | `LLM_TEMPERATURE` | `0.2` | sampling temperature |
//! | `LLM_MAX_TOKENS` | `256` | completion length limit |
//!
//! The escalation backend is all or nothing: once `LLM_ESCALATION_BACKEND`
//! is set, the other three escalation keys are required too.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::error::RunnerError;

/// Everything the service needs to start.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Listen address.
    pub bind_addr: String,
    /// Backend asked first.
    pub primary: LlmBackendConfig,
    /// Backend asked when the primary fails.
    pub escalation: Option<LlmBackendConfig>,
    /// Deadline for one answer, both backends included.
    pub decision_timeout: Duration,
    /// Directory holding `system.j2`, `decision.j2` and `trade.j2`.
    pub templates_dir: String,
    /// Sampling settings shared by every backend.
    pub sampling: SamplingConfig,
}

/// Where one backend lives and which model it serves.
#[derive(Debug, Clone)]
pub struct LlmBackendConfig {
    /// Wire format.
    pub backend_type: BackendType,
    /// Base URL, without the endpoint path.
    pub api_url: String,
    /// Credential sent with every request.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Sampling temperature.
    pub temperature: f64,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 256,
        }
    }
}

/// The two completion wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI` chat completions, also served by `DeepSeek` and Ollama.
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

impl FromStr for BackendType {
    type Err = RunnerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(RunnerError::Config(format!("unknown backend type: {other}"))),
        }
    }
}

impl RunnerConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which returns `None` for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let primary = backend(&lookup, "LLM_DEFAULT")?;
        let escalation = if lookup("LLM_ESCALATION_BACKEND").is_some() {
            Some(backend(&lookup, "LLM_ESCALATION")?)
        } else {
            None
        };

        let defaults = SamplingConfig::default();
        Ok(Self {
            bind_addr: lookup("RUNNER_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_owned()),
            primary,
            escalation,
            decision_timeout: Duration::from_millis(env_or(&lookup, "DECISION_TIMEOUT_MS", 25_000)?),
            templates_dir: lookup("TEMPLATES_DIR").unwrap_or_else(|| "templates".to_owned()),
            sampling: SamplingConfig {
                temperature: env_or(&lookup, "LLM_TEMPERATURE", defaults.temperature)?,
                max_tokens: env_or(&lookup, "LLM_MAX_TOKENS", defaults.max_tokens)?,
            },
        })
    }
}

/// Parse `name` if set, else `default`.
fn env_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, RunnerError>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(name).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid {name}: {e}")))
    })
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, RunnerError> {
    lookup(name).ok_or_else(|| RunnerError::Config(format!("missing required env var {name}")))
}

/// The four `{prefix}_*` keys describing one backend.
fn backend(lookup: &impl Fn(&str) -> Option<String>, prefix: &str) -> Result<LlmBackendConfig, RunnerError> {
    Ok(LlmBackendConfig {
        backend_type: required(lookup, &format!("{prefix}_BACKEND"))?.parse()?,
        api_url: required(lookup, &format!("{prefix}_API_URL"))?,
        api_key: required(lookup, &format!("{prefix}_API_KEY"))?,
        model: required(lookup, &format!("{prefix}_MODEL"))?,
    })
}
