//! Platform selection: the single mapping from identifier to backend.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::Config;
use crate::error::BackendError;

use super::{Backend, OllamaBackend, OpenAiBackend};

/// Supported model platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    OpenAi,
    Ollama,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::OpenAi, Platform::Ollama];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::OpenAi => "openai",
            Platform::Ollama => "ollama",
        }
    }

    /// Model used when the configuration leaves the model empty.
    pub fn default_model(&self) -> &'static str {
        match self {
            Platform::OpenAi => "gpt-4o-mini",
            Platform::Ollama => "llama3.2",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| BackendError::UnknownPlatform(s.to_string()))
    }
}

/// Build the backend named by `config.platform`.
///
/// Unknown identifiers fail before any HTTP client is created.
pub fn create_backend(config: &Config) -> Result<Box<dyn Backend>, BackendError> {
    let platform: Platform = config.platform.parse()?;
    debug!(%platform, "constructing backend");

    match platform {
        Platform::OpenAi => Ok(Box::new(OpenAiBackend::new(config))),
        Platform::Ollama => Ok(Box::new(OllamaBackend::new(config)?)),
    }
}
