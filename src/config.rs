//! Per-invocation configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::git::DiffStrategy;

/// Default request timeout for model calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default completion token limit.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Everything one generation run needs. Built once by the caller.
#[derive(Debug, Clone)]
pub struct Config {
    pub source_ref: String,
    /// `None` compares against the current HEAD commit.
    pub destination_ref: Option<String>,
    pub platform: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Base URL override for the backend API.
    pub endpoint: Option<String>,
    pub diff_strategy: DiffStrategy,
    pub workdir: PathBuf,
}

impl Config {
    pub fn new(source_ref: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            source_ref: source_ref.into(),
            destination_ref: None,
            platform: platform.into(),
            api_key: String::new(),
            model: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoint: None,
            diff_strategy: DiffStrategy::default(),
            workdir: PathBuf::from("."),
        }
    }

    /// Set the destination reference. Empty strings mean "current HEAD".
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        let destination = destination.into();
        self.destination_ref = if destination.trim().is_empty() {
            None
        } else {
            Some(destination)
        };
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_diff_strategy(mut self, strategy: DiffStrategy) -> Self {
        self.diff_strategy = strategy;
        self
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// Request timeout as a [`Duration`]. A zero value falls back to the default.
    pub fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }

    /// Destination reference as diffed, with the HEAD default applied.
    pub fn destination_or_head(&self) -> &str {
        self.destination_ref.as_deref().unwrap_or("HEAD")
    }
}
