//! gitgen - turn git diffs into commit messages, code reviews and test cases.
//!
//! # Overview
//!
//! gitgen computes the diff between two references (through the `git` CLI or
//! by reading the repository with git2), pairs it with a fixed instruction for
//! the requested task, and sends both to a hosted (OpenAI) or local (Ollama)
//! model. The generated text is returned as-is.

pub mod config;
pub mod error;
pub mod generate;
pub mod git;
pub mod llm;
pub mod prompt;

// Re-export commonly used types
pub use config::Config;
pub use error::{BackendError, DiffError, GenerateError, PromptError};
pub use generate::{Observer, SilentObserver, TracingObserver, generate, generate_with};
pub use git::{DiffProvider, DiffStrategy, GitCliDiff, RepositoryDiff};
pub use llm::{Backend, ModelResponse, Platform, create_backend};
pub use prompt::{PromptPair, TaskType};
