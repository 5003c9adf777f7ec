//! Error types for gitgen modules using thiserror.

use thiserror::Error;

/// Errors from diff computation, through either the git CLI or git2.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("git executable not found in PATH. Install git or use --diff-strategy repository")]
    GitNotInstalled,

    #[error("Failed to spawn git process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git diff exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Malformed reference name '{0}'")]
    MalformedReference(String),

    #[error("Failed to find reference '{reference}': {reason}")]
    ReferenceNotFound { reference: String, reason: String },

    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to compute diff: {0}")]
    Computation(#[source] git2::Error),
}

impl DiffError {
    /// Whether the failure came from a malformed or unknown reference name.
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            DiffError::MalformedReference(_) | DiffError::ReferenceNotFound { .. }
        )
    }
}

/// Errors from instruction selection.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PromptError {
    #[error("Invalid task type '{0}'. Expected one of: commit-message, code-review, test-case")]
    InvalidTaskType(String),
}

/// Errors from model backend construction and execution.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Unknown platform '{0}'. Supported platforms: openai, ollama")]
    UnknownPlatform(String),

    #[error("{platform} backend unavailable: {reason}")]
    Unavailable { platform: String, reason: String },

    #[error("{platform} rejected the credentials: {message}")]
    Authentication { platform: String, message: String },

    #[error("Rate limited by {platform}: {message}")]
    RateLimited { platform: String, message: String },

    #[error("Failed to connect to {platform}: {reason}")]
    Connection { platform: String, reason: String },

    #[error("Model request timed out after {0} seconds")]
    Timeout(u64),

    #[error("{platform} API returned status {status}: {message}")]
    Api {
        platform: String,
        status: u16,
        message: String,
    },

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Failed to decode model response: {0}")]
    InvalidResponse(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

impl BackendError {
    /// Whether the failure happened while selecting or building the backend,
    /// before any request was sent.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            BackendError::UnknownPlatform(_) | BackendError::Unavailable { .. }
        )
    }
}

/// Errors from the end-to-end generation flow.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error("No changes found between {source_ref} and {destination_ref}. Nothing to generate.")]
    NoChanges {
        source_ref: String,
        destination_ref: String,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_errors_are_classified() {
        assert!(DiffError::MalformedReference("../x".to_string()).is_reference_error());
        assert!(
            DiffError::ReferenceNotFound {
                reference: "nope".to_string(),
                reason: "not found".to_string(),
            }
            .is_reference_error()
        );
        assert!(!DiffError::GitNotInstalled.is_reference_error());
    }

    #[test]
    fn test_construction_errors_are_classified() {
        assert!(BackendError::UnknownPlatform("bogus".to_string()).is_construction_error());
        assert!(
            BackendError::Unavailable {
                platform: "ollama".to_string(),
                reason: "bad url".to_string(),
            }
            .is_construction_error()
        );
        assert!(!BackendError::Timeout(5).is_construction_error());
        assert!(
            !BackendError::Connection {
                platform: "openai".to_string(),
                reason: "connection refused".to_string(),
            }
            .is_construction_error()
        );
        assert!(!BackendError::EmptyResponse.is_construction_error());
    }

    #[test]
    fn test_unknown_platform_message_names_identifier() {
        let err = BackendError::UnknownPlatform("bogus".to_string());
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_generate_error_is_transparent_for_diff() {
        let err: GenerateError = DiffError::MalformedReference("../../etc".to_string()).into();
        assert_eq!(err.to_string(), "Malformed reference name '../../etc'");
    }
}
