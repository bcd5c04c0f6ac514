//! Error types for the decision service.
//!
//! Uses `thiserror` for typed errors that surface through the whole
//! pipeline: configuration, prompt rendering, LLM calls and reply parsing.

/// Errors that can occur while serving decisions.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Failed to load or render a prompt template.
    #[error("template error: {0}")]
    Template(String),

    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// The LLM reply could not be turned into an answer.
    #[error("reply parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The HTTP listener could not be bound or failed while serving.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}
