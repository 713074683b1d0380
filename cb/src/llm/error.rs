//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Failures of a single completion call
///
/// The pipeline embeds the display text verbatim after its own prefix.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited by provider, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("LLM not configured: {0}")]
    Config(String),
}

impl LlmError {
    /// Whether calling again later could plausibly succeed
    ///
    /// Nothing retries internally; callers use this to word their reporting.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => *status >= 500 || *status == 408,
            LlmError::Network(_) => true,
            LlmError::Timeout(_) => true,
            LlmError::InvalidResponse(_) => false,
            LlmError::Json(_) => false,
            LlmError::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(
            LlmError::RateLimited {
                retry_after: Duration::from_secs(60)
            }
            .is_retryable()
        );

        assert!(
            LlmError::ApiError {
                status: 503,
                message: "Unavailable".to_string()
            }
            .is_retryable()
        );

        assert!(
            !LlmError::ApiError {
                status: 400,
                message: "Bad request".to_string()
            }
            .is_retryable()
        );

        assert!(LlmError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(!LlmError::InvalidResponse("Bad JSON".to_string()).is_retryable());
        assert!(!LlmError::Config("missing key".to_string()).is_retryable());
    }

    #[test]
    fn test_display() {
        let err = LlmError::ApiError {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: unauthorized");

        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Rate limited by provider, retry after 30s");
    }
}
