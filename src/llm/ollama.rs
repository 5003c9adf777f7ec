//! Locally served Ollama backend.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::BackendError;

use super::http::{build_client, status_error, transport_error};
use super::{Backend, ModelResponse, Platform};

/// Default address of a local Ollama server.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Environment variable Ollama itself uses for its listen address.
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: Options,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct Options {
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Calls `POST {base}/api/chat` on an Ollama server.
pub struct OllamaBackend {
    model: String,
    max_tokens: u32,
    timeout: Duration,
    base_url: Url,
    http: reqwest::Client,
}

impl OllamaBackend {
    /// Build the backend, failing fast on a misconfigured server address.
    ///
    /// The address comes from `config.endpoint`, then `OLLAMA_HOST`, then
    /// [`DEFAULT_OLLAMA_URL`].
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let raw = config
            .endpoint
            .clone()
            .or_else(|| env::var(OLLAMA_HOST_ENV).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
        let base_url = parse_base_url(&raw)?;

        let timeout = config.timeout();
        let http = build_client(timeout).map_err(|e| unavailable(e.to_string()))?;

        let model = if config.model.trim().is_empty() {
            Platform::Ollama.default_model().to_string()
        } else {
            config.model.clone()
        };

        debug!(%base_url, %model, "ollama backend configured");

        Ok(Self {
            model,
            max_tokens: config.max_tokens,
            timeout,
            base_url,
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.as_str().trim_end_matches('/'))
    }
}

fn unavailable(reason: impl Into<String>) -> BackendError {
    BackendError::Unavailable {
        platform: Platform::Ollama.to_string(),
        reason: reason.into(),
    }
}

/// Parse a server address, accepting the scheme-less `host:port` form.
fn parse_base_url(raw: &str) -> Result<Url, BackendError> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| unavailable(format!("invalid server address '{raw}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(unavailable(format!(
            "unsupported scheme '{}' in '{raw}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(unavailable(format!("missing host in '{raw}'")));
    }

    Ok(url)
}

#[async_trait]
impl Backend for OllamaBackend {
    fn platform(&self) -> Platform {
        Platform::Ollama
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
            stream: false,
            options: Options {
                num_predict: self.max_tokens,
            },
        };

        debug!(model = %self.model, "sending ollama chat request");

        let response = self
            .http
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(Platform::Ollama, e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(Platform::Ollama, e, self.timeout))?;

        if !status.is_success() {
            return Err(status_error(Platform::Ollama, status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .message
            .map(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(BackendError::EmptyResponse)?;

        Ok(ModelResponse {
            content,
            model: parsed.model,
        })
    }
}
