//! LLM completion clients.
//!
//! One [`LlmBackend`] speaks one of two wire formats, chosen by
//! [`BackendType`]: OpenAI-compatible chat completions or the Anthropic
//! Messages API. Requests and replies are typed structs, and the reply text
//! is returned untouched for [`crate::parse`] to interpret.

use serde::{Deserialize, Serialize};

use crate::config::{BackendType, LlmBackendConfig, SamplingConfig};
use crate::error::RunnerError;
use crate::prompt::RenderedPrompt;

/// Version header required by the Messages API.
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// `POST {api_url}/chat/completions`
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `POST {api_url}/messages`; the system prompt is a top-level field.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: [Message<'a>; 1],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, RunnerError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RunnerError::LlmBackend("chat completion had no message content".to_owned()))
    }
}

impl MessagesResponse {
    fn into_text(self) -> Result<String, RunnerError> {
        self.content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| RunnerError::LlmBackend("messages reply had no text block".to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// A configured completion endpoint.
pub struct LlmBackend {
    wire: BackendType,
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    sampling: SamplingConfig,
}

impl LlmBackend {
    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self.wire {
            BackendType::OpenAi => "openai-compatible",
            BackendType::Anthropic => "anthropic",
        }
    }

    /// Send `prompt` and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::LlmBackend`] if the call fails, the endpoint
    /// answers with a non-2xx status, or the reply carries no text.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, RunnerError> {
        match self.wire {
            BackendType::OpenAi => {
                let body = ChatRequest {
                    model: &self.model,
                    messages: [
                        Message {
                            role: "system",
                            content: &prompt.system,
                        },
                        Message {
                            role: "user",
                            content: &prompt.user,
                        },
                    ],
                    temperature: self.sampling.temperature,
                    max_tokens: self.sampling.max_tokens,
                };
                let request = self
                    .client
                    .post(format!("{}/chat/completions", self.api_url))
                    .bearer_auth(&self.api_key)
                    .json(&body);
                self.send::<ChatResponse>(request).await?.into_text()
            }
            BackendType::Anthropic => {
                let body = MessagesRequest {
                    model: &self.model,
                    system: &prompt.system,
                    messages: [Message {
                        role: "user",
                        content: &prompt.user,
                    }],
                    temperature: self.sampling.temperature,
                    max_tokens: self.sampling.max_tokens,
                };
                let request = self
                    .client
                    .post(format!("{}/messages", self.api_url))
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&body);
                self.send::<MessagesResponse>(request).await?.into_text()
            }
        }
    }

    async fn send<R: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<R, RunnerError> {
        let name = self.name();
        let response = request
            .send()
            .await
            .map_err(|e| RunnerError::LlmBackend(format!("{name} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RunnerError::LlmBackend(format!(
                "{name} answered {status}: {detail}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| RunnerError::LlmBackend(format!("{name} reply not understood: {e}")))
    }
}

/// Create an LLM backend from configuration.
pub fn create_backend(config: &LlmBackendConfig, sampling: SamplingConfig) -> LlmBackend {
    LlmBackend {
        wire: config.backend_type,
        client: reqwest::Client::new(),
        api_url: config.api_url.trim_end_matches('/').to_owned(),
        api_key: config.api_key.clone(),
        model: config.model.clone(),
        sampling,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn backend_config(backend_type: BackendType) -> LlmBackendConfig {
        LlmBackendConfig {
            backend_type,
            api_url: "http://localhost:11434/v1/".to_owned(),
            api_key: "test".to_owned(),
            model: "test-model".to_owned(),
        }
    }

    #[test]
    fn chat_reply_text() {
        let reply: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "MOVE EAST"}}]
        }))
        .unwrap();
        assert_eq!(reply.into_text().ok().as_deref(), Some("MOVE EAST"));

        let empty: ChatResponse = serde_json::from_value(serde_json::json!({"error": "rate_limit"})).unwrap();
        assert!(empty.into_text().is_err());
    }

    #[test]
    fn messages_reply_skips_non_text_blocks() {
        let reply: MessagesResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "thinking"},
                {"type": "text", "text": "{\"decision\": \"REST\"}"}
            ]
        }))
        .unwrap();
        assert!(reply.into_text().unwrap().contains("REST"));

        let empty: MessagesResponse = serde_json::from_value(serde_json::json!({"content": []})).unwrap();
        assert!(empty.into_text().is_err());
    }

    #[test]
    fn request_bodies_follow_each_wire_format() {
        let prompt = RenderedPrompt {
            system: String::from("rules"),
            user: String::from("situation"),
        };
        let chat = serde_json::to_value(ChatRequest {
            model: "m",
            messages: [
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: 0.5,
            max_tokens: 64,
        })
        .unwrap();
        assert_eq!(chat["messages"][0]["role"], "system");
        assert_eq!(chat["max_tokens"], 64);

        let messages = serde_json::to_value(MessagesRequest {
            model: "m",
            system: &prompt.system,
            messages: [Message {
                role: "user",
                content: &prompt.user,
            }],
            temperature: 0.5,
            max_tokens: 64,
        })
        .unwrap();
        assert_eq!(messages["system"], "rules");
        assert_eq!(messages["messages"][0]["content"], "situation");
    }

    #[test]
    fn factory_normalises_url() {
        let sampling = SamplingConfig::default();
        let openai = create_backend(&backend_config(BackendType::OpenAi), sampling);
        assert_eq!(openai.name(), "openai-compatible");
        assert_eq!(openai.api_url, "http://localhost:11434/v1");

        let anthropic = create_backend(&backend_config(BackendType::Anthropic), sampling);
        assert_eq!(anthropic.name(), "anthropic");
    }
}
