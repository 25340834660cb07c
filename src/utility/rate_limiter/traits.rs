// 3rd party crates
use async_trait::async_trait;

// Current module imports
use super::errors::RateLimitError;
use super::types::AcquireOptions;

/// Admission control for outbound calls to rate-limited providers.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait for a token of `provider` on behalf of `user_id`, using the
    /// provider's queue timeout.
    async fn acquire(&self, provider: &str, user_id: &str) -> Result<(), RateLimitError> {
        self.acquire_with(provider, user_id, AcquireOptions::default())
            .await
    }

    /// Wait for a token with per-call options.
    async fn acquire_with(
        &self,
        provider: &str,
        user_id: &str,
        options: AcquireOptions,
    ) -> Result<(), RateLimitError>;

    /// Take a token only if one is free right now and nobody is queued.
    fn try_acquire(&self, provider: &str, user_id: &str) -> Result<bool, RateLimitError>;
}
