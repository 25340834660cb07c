//! Rate Limiter Module
//!
//! Per-provider, per-user token buckets guarding outbound calls to AI
//! providers. Every `(provider, user)` pair owns an independent bucket whose
//! capacity and refill interval come from the provider's quota profile.
//!
//! # Behaviour
//!
//! - Tokens are derived lazily from elapsed monotonic time on every touch,
//!   there is no background refill task
//! - A caller finding the bucket empty is queued and served strictly in
//!   arrival order, or fails with `RateLimitError::Timeout`
//! - Tokens are never returned: they model requests per interval, not
//!   concurrency
//! - `reset` clears buckets by provider, user, both or globally and fails
//!   the affected waiters with `RateLimitError::Cancelled`
//!
//! # Example
//!
//! ```rust,no_run
//! use studio_limiter::utility::rate_limiter::{RateLimiter, TokenBucketRateLimiter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let limiter = TokenBucketRateLimiter::default();
//! limiter.acquire("openai", "user-42").await?;
//! // issue the OpenAI request here
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod errors;
pub mod functions;
pub mod impls;
pub mod traits;
pub mod types;


pub use errors::RateLimitError;
pub use functions::{acquire_rate_limit, with_rate_limit};
pub use traits::RateLimiter;
pub use types::{AcquireOptions, BucketKey, BucketStatus, StatusLevel, TokenBucketRateLimiter};
