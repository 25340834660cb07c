// Standard library
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

// 3rd party crates
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time::Instant;

// Project imports
use crate::metrics::MetricsManager;
use crate::providers::types::ProviderTable;

/// Identifies one bucket: a provider quota applied to one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub provider: String,
    pub user_id: String,
}

/// A caller parked until its bucket has a token for it.
#[derive(Debug)]
pub(crate) struct Waiter {
    pub id: u64,
    pub enqueued_at: Instant,
    pub grant: oneshot::Sender<()>,
}

/// Token state of a single `(provider, user)` pair.
#[derive(Debug)]
pub(crate) struct Bucket {
    pub available_tokens: u32,
    pub last_refill: Instant,
    pub waiters: VecDeque<Waiter>,
}

#[derive(Debug, Default)]
pub(crate) struct LimiterState {
    pub buckets: HashMap<BucketKey, Bucket>,
    pub next_waiter_id: u64,
}

/// Per-call overrides for `acquire_with`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquireOptions {
    /// How long to wait in the queue before giving up
    pub timeout: Option<Duration>,
}

/// Coarse health of a bucket derived from its fill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Healthy,
    Degraded,
    Exhausted,
}

/// Point-in-time view of a bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStatus {
    pub available_tokens: u32,
    pub capacity: u32,
    pub percent_available: f64,
    pub queued_requests: usize,
    pub status: StatusLevel,
}

/// Token bucket rate limiter keyed by `(provider, user)`.
///
/// Clones share the same buckets, so one instance can be handed to every
/// route handler.
#[derive(Clone)]
pub struct TokenBucketRateLimiter {
    pub(crate) providers: Arc<ProviderTable>,
    pub(crate) default_timeout: Duration,
    pub(crate) state: Arc<Mutex<LimiterState>>,
    pub(crate) metrics: MetricsManager,
}
