//! HTTP plumbing shared by the backends.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::warn;

use crate::error::BackendError;

use super::Platform;

/// Longest slice of a raw error body echoed back in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Build a client with the request timeout applied.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("gitgen/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
}

/// Map a failed send/receive to a backend error.
pub fn transport_error(platform: Platform, err: reqwest::Error, timeout: Duration) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(timeout.as_secs())
    } else if err.is_connect() {
        BackendError::Connection {
            platform: platform.to_string(),
            reason: err.to_string(),
        }
    } else {
        BackendError::Request(err)
    }
}

/// Map a non-success HTTP status to a backend error.
pub fn status_error(platform: Platform, status: StatusCode, body: &str) -> BackendError {
    let message = error_message(body);
    warn!(%platform, status = status.as_u16(), "model API request failed: {}", message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Authentication {
            platform: platform.to_string(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited {
            platform: platform.to_string(),
            message,
        },
        _ => BackendError::Api {
            platform: platform.to_string(),
            status: status.as_u16(),
            message,
        },
    }
}

/// Pull a human-readable message out of an API error body.
///
/// Understands `{"error": {"message": ...}}` and `{"error": "..."}`, and
/// falls back to the (truncated) raw body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &value["error"];
        if let Some(msg) = error["message"].as_str().or_else(|| error.as_str()) {
            return msg.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_openai_shape() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key provided");
    }

    #[test]
    fn test_error_message_ollama_shape() {
        let body = r#"{"error": "model 'nope' not found"}"#;
        assert_eq!(error_message(body), "model 'nope' not found");
    }

    #[test]
    fn test_error_message_raw_body_is_truncated() {
        let body = "x".repeat(1000);
        assert_eq!(error_message(&body).len(), MAX_ERROR_BODY_CHARS);
        assert_eq!(error_message("   "), "no response body");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(Platform::OpenAi, StatusCode::UNAUTHORIZED, ""),
            BackendError::Authentication { .. }
        ));
        assert!(matches!(
            status_error(Platform::OpenAi, StatusCode::TOO_MANY_REQUESTS, ""),
            BackendError::RateLimited { .. }
        ));
        assert!(matches!(
            status_error(Platform::Ollama, StatusCode::NOT_FOUND, ""),
            BackendError::Api { status: 404, .. }
        ));
    }
}
