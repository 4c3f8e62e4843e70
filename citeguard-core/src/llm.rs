//! Generation-backend abstraction.
//!
//! Defines the [`LlmProvider`] trait for model-agnostic text generation,
//! an OpenAI-compatible implementation, and a mock provider for
//! deterministic tests. The orchestrator treats generation as a black box
//! that may return empty text or fail outright.

use crate::config::LlmConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// A generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Optional system instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// The user prompt (context plus question).
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// A generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Trait for generation backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Perform a full completion and return the response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Return the model name.
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible provider. Works against OpenAI, Azure OpenAI, Ollama,
/// vLLM, and any endpoint following the chat completions API format.
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiCompatProvider {
    /// Create a provider from configuration.
    ///
    /// The API key comes from `config.api_key`, then the environment variable
    /// named by `config.api_key_env`. Local endpoints (localhost) fall back
    /// to a dummy bearer token.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let is_local =
            config.base_url.contains("localhost") || config.base_url.contains("127.0.0.1");

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(&config.api_key_env).ok())
            .or_else(|| {
                if is_local {
                    debug!("No API key set for local provider; using dummy bearer token");
                    Some("local".to_string())
                } else {
                    None
                }
            })
            .ok_or_else(|| LlmError::AuthFailed {
                provider: format!(
                    "OpenAI-compatible: env var '{}' not set",
                    config.api_key_env
                ),
            })?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Parse an OpenAI-format response body into the answer text.
    fn parse_response(body: &Value) -> Result<(String, Option<String>), LlmError> {
        let choice = body
            .get("choices")
            .and_then(|c| c.get(0))
            .ok_or_else(|| LlmError::ResponseParse {
                message: "No choices in response".to_string(),
            })?;

        let finish_reason = choice
            .get("finish_reason")
            .and_then(|f| f.as_str())
            .map(|s| s.to_string());

        let text = choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| LlmError::ResponseParse {
                message: "No message content in choice".to_string(),
            })?
            .to_string();

        Ok((text, finish_reason))
    }

    /// Map an HTTP status code to the appropriate LlmError.
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> LlmError {
        match status.as_u16() {
            401 => {
                debug!(body = %body, "Authentication failed (401)");
                LlmError::AuthFailed {
                    provider: "OpenAI-compatible".to_string(),
                }
            }
            429 => LlmError::RateLimited {
                retry_after_secs: 5,
            },
            status if status >= 500 => LlmError::ApiRequest {
                message: format!("Server error ({status}): {body}"),
            },
            _ => LlmError::ApiRequest {
                message: format!("HTTP {status}: {body}"),
            },
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        debug!(model = %self.model, url = %url, "sending completion request");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    LlmError::Connection {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| LlmError::Connection {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &text));
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| LlmError::ResponseParse {
            message: e.to_string(),
        })?;
        let (content, finish_reason) = Self::parse_response(&value)?;

        Ok(CompletionResponse {
            text: content,
            model: self.model.clone(),
            finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Mock provider for tests: returns queued responses in order.
pub struct MockLlmProvider {
    model: String,
    responses: std::sync::Mutex<Vec<Result<CompletionResponse, LlmError>>>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            responses: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that always returns the given text.
    ///
    /// Queues multiple copies of the response so it can handle multiple calls.
    pub fn with_response(text: &str) -> Self {
        let provider = Self::new();
        for _ in 0..20 {
            provider.queue_response(Self::text_response(text));
        }
        provider
    }

    /// Create a provider whose every call fails with a connection error.
    pub fn unreachable() -> Self {
        let provider = Self::new();
        for _ in 0..20 {
            provider.queue_error(LlmError::Connection {
                message: "mock backend unreachable".to_string(),
            });
        }
        provider
    }

    /// Queue a response to be returned by the next `complete` call.
    pub fn queue_response(&self, response: CompletionResponse) {
        self.responses.lock().unwrap().push(Ok(response));
    }

    /// Queue an error to be returned by the next `complete` call.
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push(Err(error));
    }

    /// Create a simple text response for testing.
    pub fn text_response(text: &str) -> CompletionResponse {
        CompletionResponse {
            text: text.to_string(),
            model: "mock-model".to_string(),
            finish_reason: Some("stop".to_string()),
        }
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::ApiRequest {
                message: "MockLlmProvider: no queued responses".to_string(),
            });
        }
        responses.remove(0)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_mock_returns_queued_in_order() {
        let mock = MockLlmProvider::new();
        mock.queue_response(MockLlmProvider::text_response("first"));
        mock.queue_response(MockLlmProvider::text_response("second"));

        let request = CompletionRequest {
            system: None,
            prompt: "q".to_string(),
            temperature: 0.0,
            max_tokens: 16,
        };
        assert_eq!(mock.complete(request.clone()).await.unwrap().text, "first");
        assert_eq!(mock.complete(request).await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn test_mock_unreachable_fails() {
        let mock = MockLlmProvider::unreachable();
        let request = CompletionRequest {
            system: None,
            prompt: "q".to_string(),
            temperature: 0.0,
            max_tokens: 16,
        };
        let err = mock.complete(request).await.unwrap_err();
        assert!(matches!(err, LlmError::Connection { .. }));
    }

    #[test]
    fn test_parse_response_extracts_content() {
        let body = json!({
            "choices": [{
                "message": { "role": "assistant", "content": "an answer" },
                "finish_reason": "stop"
            }]
        });
        let (text, finish) = OpenAiCompatProvider::parse_response(&body).unwrap();
        assert_eq!(text, "an answer");
        assert_eq!(finish.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_response_no_choices() {
        let body = json!({ "choices": [] });
        let err = OpenAiCompatProvider::parse_response(&body).unwrap_err();
        assert!(matches!(err, LlmError::ResponseParse { .. }));
    }

    #[test]
    fn test_map_http_error_variants() {
        let auth = OpenAiCompatProvider::map_http_error(
            reqwest::StatusCode::UNAUTHORIZED,
            "unauthorized",
        );
        assert!(matches!(auth, LlmError::AuthFailed { .. }));

        let rate = OpenAiCompatProvider::map_http_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            "slow down",
        );
        assert!(matches!(rate, LlmError::RateLimited { .. }));

        let server = OpenAiCompatProvider::map_http_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        );
        assert!(matches!(server, LlmError::ApiRequest { .. }));
    }
}
