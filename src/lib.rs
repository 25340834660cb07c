//! Per-provider, per-user rate limiting for outbound AI provider calls.
//!
//! Route handlers share one [`TokenBucketRateLimiter`] and call
//! [`acquire_rate_limit`] before each request to a provider.
//!
//! [`TokenBucketRateLimiter`]: utility::rate_limiter::TokenBucketRateLimiter
//! [`acquire_rate_limit`]: utility::rate_limiter::acquire_rate_limit

pub mod inspector;
pub mod metrics;
pub mod providers;
pub mod settings;
pub mod utility;
