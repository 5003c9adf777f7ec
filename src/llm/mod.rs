//! Model backends and platform routing.

pub mod http;
pub mod ollama;
pub mod openai;
pub mod router;

use async_trait::async_trait;

use crate::error::BackendError;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use router::{Platform, create_backend};

/// Generated text returned by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub content: String,
    /// Model name as reported by the API, when it reports one.
    pub model: Option<String>,
}

impl ModelResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
        }
    }
}

/// A model service that turns an instruction plus user content into text.
///
/// This abstraction allows mocking the HTTP backends in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    fn platform(&self) -> Platform;

    /// Send `system` as the instruction and `user` as the message content.
    async fn execute(&self, system: &str, user: &str) -> Result<ModelResponse, BackendError>;
}
