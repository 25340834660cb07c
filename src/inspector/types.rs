// Standard library
use std::time::Duration;

// Project imports
use crate::utility::rate_limiter::TokenBucketRateLimiter;

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status { provider: String, user_id: String },
    All { user_id: String },
    Next { provider: String, user_id: String },
    Acquire {
        provider: String,
        user_id: String,
        timeout: Option<Duration>,
    },
    Try { provider: String, user_id: String },
    Reset {
        provider: Option<String>,
        user_id: Option<String>,
    },
    Providers,
    Metrics,
    Help,
    Quit,
}

/// Executes console commands against a limiter.
#[derive(Debug, Clone)]
pub struct Inspector {
    pub limiter: TokenBucketRateLimiter,
}
