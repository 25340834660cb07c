// Standard library
use std::time::Duration;

// 3rd party crates
use serde_json::{json, Value};
use thiserror::Error;

/// Message shown to end users when their provider quota is used up.
pub const RATE_LIMITED_MESSAGE: &str =
    "Your AI provider is currently rate limited, please wait and try again.";

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit wait for provider '{provider}' and user '{user_id}' timed out after {waited:?}")]
    Timeout {
        provider: String,
        user_id: String,
        waited: Duration,
    },

    #[error("Unknown rate limit provider '{0}'")]
    UnknownProvider(String),

    #[error("Rate limit wait for provider '{provider}' and user '{user_id}' was cancelled by a reset")]
    Cancelled { provider: String, user_id: String },
}

impl RateLimitError {
    /// Machine readable code returned to API clients as `errorCode`.
    pub fn error_code(&self) -> &'static str {
        match self {
            RateLimitError::Timeout { .. } => "rate_limit_timeout",
            RateLimitError::UnknownProvider(_) => "unknown_provider",
            RateLimitError::Cancelled { .. } => "rate_limit_reset",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            RateLimitError::Timeout { .. } => 429,
            RateLimitError::UnknownProvider(_) => 500,
            RateLimitError::Cancelled { .. } => 503,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RateLimitError::Timeout { .. })
    }

    pub fn provider(&self) -> &str {
        match self {
            RateLimitError::Timeout { provider, .. }
            | RateLimitError::Cancelled { provider, .. }
            | RateLimitError::UnknownProvider(provider) => provider,
        }
    }

    /// JSON body a route handler returns alongside `http_status`.
    pub fn to_response_body(&self) -> Value {
        match self {
            RateLimitError::Timeout { waited, .. } => json!({
                "error": RATE_LIMITED_MESSAGE,
                "errorCode": self.error_code(),
                "provider": self.provider(),
                "waitedMs": waited.as_millis() as u64,
            }),
            RateLimitError::UnknownProvider(_) => json!({
                "error": "AI provider is not configured.",
                "errorCode": self.error_code(),
                "provider": self.provider(),
            }),
            RateLimitError::Cancelled { .. } => json!({
                "error": RATE_LIMITED_MESSAGE,
                "errorCode": self.error_code(),
                "provider": self.provider(),
            }),
        }
    }
}
