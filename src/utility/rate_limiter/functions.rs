// Standard library
use std::future::Future;

// 3rd party crates
use tracing::warn;

// Current module imports
use super::errors::RateLimitError;
use super::traits::RateLimiter;

/// Gate an outbound provider call. Route handlers call this right before
/// issuing the request and turn an error into an HTTP response with
/// `RateLimitError::http_status` and `RateLimitError::to_response_body`.
pub async fn acquire_rate_limit<L>(
    limiter: &L,
    provider: &str,
    user_id: &str,
) -> Result<(), RateLimitError>
where
    L: RateLimiter + ?Sized,
{
    limiter.acquire(provider, user_id).await.map_err(|e| {
        warn!(
            provider = %provider,
            user_id = %user_id,
            error_code = e.error_code(),
            "Outbound call blocked by rate limiter: {}",
            e
        );
        e
    })
}

/// Runs `call` once a token for `(provider, user_id)` is held.
/// `call` is not started when the limiter refuses.
pub async fn with_rate_limit<L, F, Fut, T>(
    limiter: &L,
    provider: &str,
    user_id: &str,
    call: F,
) -> Result<T, RateLimitError>
where
    L: RateLimiter + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    acquire_rate_limit(limiter, provider, user_id).await?;
    Ok(call().await)
}
