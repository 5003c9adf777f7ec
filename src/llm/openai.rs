//! Hosted OpenAI chat completions backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::BackendError;

use super::http::{build_client, status_error, transport_error};
use super::{Backend, ModelResponse, Platform};

/// Default API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Calls `POST {base}/chat/completions` with bearer auth.
///
/// Construction never fails; a bad key, an unreachable host or an HTTP
/// client that could not be configured shows up on the first
/// [`Backend::execute`] call.
pub struct OpenAiBackend {
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    base_url: String,
    http: Result<reqwest::Client, String>,
}

impl OpenAiBackend {
    pub fn new(config: &Config) -> Self {
        Self::with_client(config, build_client(config.timeout()))
    }

    fn with_client(config: &Config, http: Result<reqwest::Client, reqwest::Error>) -> Self {
        let timeout = config.timeout();
        let http = http.map_err(|e| {
            warn!("Failed to configure HTTP client: {}", e);
            e.to_string()
        });

        let model = if config.model.trim().is_empty() {
            Platform::OpenAi.default_model().to_string()
        } else {
            config.model.clone()
        };

        Self {
            api_key: config.api_key.clone(),
            model,
            max_tokens: config.max_tokens,
            timeout,
            base_url: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            http,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    fn platform(&self) -> Platform {
        Platform::OpenAi
    }

    async fn execute(&self, system: &str, user: &str) -> Result<ModelResponse, BackendError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, max_tokens = self.max_tokens, "sending chat completion");

        let http = self.http.as_ref().map_err(|reason| BackendError::Unavailable {
            platform: Platform::OpenAi.to_string(),
            reason: format!("HTTP client could not be configured: {reason}"),
        })?;

        let response = http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(Platform::OpenAi, e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(Platform::OpenAi, e, self.timeout))?;

        if !status.is_success() {
            return Err(status_error(Platform::OpenAi, status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(BackendError::EmptyResponse)?;

        Ok(ModelResponse {
            content,
            model: parsed.model,
        })
    }
}
