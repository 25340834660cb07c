// Standard library
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// 3rd party crates
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, trace, warn};

// Project imports
use crate::metrics::MetricsManager;
use crate::providers::constants::DEFAULT_TIMEOUT_MS;
use crate::providers::errors::ProfileValidationError;
use crate::providers::types::{ProviderProfile, ProviderTable};

// Current module imports
use super::constants::{DEGRADED_BELOW_PERCENT, FAR_FUTURE};
use super::errors::RateLimitError;
use super::traits::RateLimiter;
use super::types::{
    AcquireOptions, Bucket, BucketKey, BucketStatus, LimiterState, StatusLevel,
    TokenBucketRateLimiter, Waiter,
};

impl BucketKey {
    pub fn new(provider: &str, user_id: &str) -> Self {
        Self {
            provider: provider.to_string(),
            user_id: user_id.to_string(),
        }
    }

    /// Whether this key falls inside a reset scope. `None` matches anything.
    pub fn matches(&self, provider: Option<&str>, user_id: Option<&str>) -> bool {
        provider.map_or(true, |p| p == self.provider)
            && user_id.map_or(true, |u| u == self.user_id)
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.user_id)
    }
}

impl Bucket {
    /// A bucket seen for the first time starts full.
    pub fn full(profile: &ProviderProfile, now: Instant) -> Self {
        Self {
            available_tokens: profile.capacity,
            last_refill: now,
            waiters: VecDeque::new(),
        }
    }

    /// Adds one token per whole refill interval elapsed since `last_refill`.
    ///
    /// Partial progress towards the next token is kept by advancing
    /// `last_refill` in whole intervals. A full bucket does not accrue.
    pub fn refill(&mut self, profile: &ProviderProfile, now: Instant) {
        if self.available_tokens >= profile.capacity {
            self.available_tokens = profile.capacity;
            self.last_refill = now;
            return;
        }

        // saturating: a clock reading older than last_refill counts as zero
        let elapsed = now.saturating_duration_since(self.last_refill);
        let interval = profile.refill_interval();
        let ticks = elapsed.as_nanos() / interval.as_nanos();
        if ticks == 0 {
            return;
        }

        let missing = profile.capacity - self.available_tokens;
        if ticks >= u128::from(missing) {
            self.available_tokens = profile.capacity;
            self.last_refill = now;
        } else {
            // ticks < missing <= u32::MAX
            let ticks = ticks as u32;
            self.available_tokens += ticks;
            self.last_refill += interval * ticks;
        }
    }

    pub fn take_token(&mut self) -> bool {
        if self.available_tokens == 0 {
            return false;
        }
        self.available_tokens -= 1;
        true
    }

    /// Hands free tokens to queued waiters, oldest first, one token each.
    /// Returns how many waiters were granted.
    pub fn drain(&mut self, key: &BucketKey, now: Instant) -> usize {
        let mut granted = 0;
        while self.available_tokens > 0 {
            let Some(waiter) = self.waiters.pop_front() else {
                break;
            };
            // A closed receiver means the caller went away; the token stays.
            if waiter.grant.send(()).is_ok() {
                self.available_tokens -= 1;
                granted += 1;
                trace!(
                    bucket = %key,
                    waiter = waiter.id,
                    "Granted token after {:?} in queue",
                    now.saturating_duration_since(waiter.enqueued_at)
                );
            }
        }
        granted
    }

    /// Drops waiters whose `acquire` future was dropped by the caller.
    pub fn prune_abandoned(&mut self) {
        self.waiters.retain(|waiter| !waiter.grant.is_closed());
    }

    /// Instant at which the next token becomes available, `now` if one already is.
    pub fn next_token_at(&self, profile: &ProviderProfile, now: Instant) -> Instant {
        if self.available_tokens > 0 {
            now
        } else {
            self.last_refill + profile.refill_interval()
        }
    }
}

impl BucketStatus {
    pub fn new(available_tokens: u32, capacity: u32, queued_requests: usize) -> Self {
        let percent_available = if capacity == 0 {
            0.0
        } else {
            f64::from(available_tokens) / f64::from(capacity) * 100.0
        };

        let status = if available_tokens == 0 {
            StatusLevel::Exhausted
        } else if percent_available < DEGRADED_BELOW_PERCENT {
            StatusLevel::Degraded
        } else {
            StatusLevel::Healthy
        };

        Self {
            available_tokens,
            capacity,
            percent_available,
            queued_requests,
            status,
        }
    }
}

impl fmt::Debug for TokenBucketRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBucketRateLimiter")
            .field("providers", &self.providers)
            .field("default_timeout", &self.default_timeout)
            .field("state", &"<LimiterState>")
            .finish()
    }
}

impl Default for TokenBucketRateLimiter {
    fn default() -> Self {
        Self::from_validated(
            ProviderTable::defaults(),
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
    }
}

impl TokenBucketRateLimiter {
    /// Create a rate limiter over a fixed provider table.
    ///
    /// Fails if any profile has a zero capacity, refill interval or timeout.
    pub fn new(
        providers: ProviderTable,
        default_timeout: Duration,
    ) -> Result<Self, ProfileValidationError> {
        providers.validate()?;
        Ok(Self::from_validated(providers, default_timeout))
    }

    fn from_validated(providers: ProviderTable, default_timeout: Duration) -> Self {
        Self {
            providers: Arc::new(providers),
            default_timeout,
            state: Arc::new(Mutex::new(LimiterState::default())),
            metrics: MetricsManager::new(),
        }
    }

    pub fn metrics(&self) -> &MetricsManager {
        &self.metrics
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn provider_table(&self) -> &ProviderTable {
        &self.providers
    }

    /// Configured provider keys in sorted order.
    pub fn providers(&self) -> Vec<String> {
        self.providers.names().map(str::to_string).collect()
    }

    fn profile(&self, provider: &str) -> Result<ProviderProfile, RateLimitError> {
        self.providers.get(provider).copied().ok_or_else(|| {
            self.metrics.record_unknown_provider();
            warn!(provider = %provider, "No quota profile for provider");
            RateLimitError::UnknownProvider(provider.to_string())
        })
    }

    /// Current token count, fill level and queue length of one bucket.
    ///
    /// Refills lazily like `acquire` but never consumes and never creates
    /// the bucket; an unseen pair reports a full bucket.
    pub fn get_status(
        &self,
        provider: &str,
        user_id: &str,
    ) -> Result<BucketStatus, RateLimitError> {
        let profile = self.profile(provider)?;
        let key = BucketKey::new(provider, user_id);

        let mut state = self.state.lock();
        let (available_tokens, queued_requests) = match state.buckets.get_mut(&key) {
            Some(bucket) => {
                bucket.refill(&profile, Instant::now());
                bucket.prune_abandoned();
                (bucket.available_tokens, bucket.waiters.len())
            }
            None => (profile.capacity, 0),
        };

        Ok(BucketStatus::new(
            available_tokens,
            profile.capacity,
            queued_requests,
        ))
    }

    /// `get_status` for every configured provider.
    pub fn get_all_status(&self, user_id: &str) -> BTreeMap<String, BucketStatus> {
        self.providers
            .names()
            .filter_map(|provider| {
                self.get_status(provider, user_id)
                    .ok()
                    .map(|status| (provider.to_string(), status))
            })
            .collect()
    }

    /// Time until the bucket produces its next token, zero if one is available.
    pub fn get_time_until_next_token(
        &self,
        provider: &str,
        user_id: &str,
    ) -> Result<Duration, RateLimitError> {
        let profile = self.profile(provider)?;
        let key = BucketKey::new(provider, user_id);
        let now = Instant::now();

        let mut state = self.state.lock();
        let wait = match state.buckets.get_mut(&key) {
            Some(bucket) => {
                bucket.refill(&profile, now);
                bucket
                    .next_token_at(&profile, now)
                    .saturating_duration_since(now)
            }
            None => Duration::ZERO,
        };

        Ok(wait)
    }

    /// Clears bucket state.
    ///
    /// - `reset(Some(p), Some(u))` clears one bucket
    /// - `reset(Some(p), None)` clears every user's bucket for `p`
    /// - `reset(None, Some(u))` clears every provider's bucket for `u`
    /// - `reset(None, None)` clears everything
    ///
    /// Waiters of cleared buckets fail with `RateLimitError::Cancelled`.
    /// Returns the number of buckets removed.
    pub fn reset(&self, provider: Option<&str>, user_id: Option<&str>) -> usize {
        let removed: Vec<Bucket> = {
            let mut state = self.state.lock();
            let keys: Vec<BucketKey> = state
                .buckets
                .keys()
                .filter(|key| key.matches(provider, user_id))
                .cloned()
                .collect();
            let removed: Vec<Bucket> = keys
                .iter()
                .filter_map(|key| state.buckets.remove(key))
                .collect();
            removed
        };

        let cleared = removed.len();
        let cancelled: usize = removed.iter().map(|bucket| bucket.waiters.len()).sum();
        // dropping the buckets closes every waiter's grant channel
        drop(removed);

        self.metrics.record_reset();
        info!(
            provider = provider.unwrap_or("*"),
            user_id = user_id.unwrap_or("*"),
            "Rate limiter reset: {} bucket(s) cleared, {} waiter(s) cancelled",
            cleared,
            cancelled
        );

        cleared
    }

    /// Removes a timed out waiter from its queue. If a grant raced the
    /// deadline the grant wins and the call succeeds.
    fn abandon(
        &self,
        key: &BucketKey,
        profile: &ProviderProfile,
        waiter_id: u64,
        grant_rx: &mut oneshot::Receiver<()>,
        started: Instant,
    ) -> Result<(), RateLimitError> {
        let timed_out = {
            let mut state = self.state.lock();
            let now = Instant::now();
            match state.buckets.get_mut(key) {
                Some(bucket) => {
                    bucket.refill(profile, now);
                    bucket.drain(key, now);
                    match bucket.waiters.iter().position(|w| w.id == waiter_id) {
                        Some(position) => {
                            bucket.waiters.remove(position);
                            true
                        }
                        None => false,
                    }
                }
                None => false,
            }
        };

        if timed_out {
            let waited = started.elapsed();
            self.metrics.record_timeout();
            warn!(
                provider = %key.provider,
                user_id = %key.user_id,
                "Gave up waiting for a token after {:?}",
                waited
            );
            return Err(RateLimitError::Timeout {
                provider: key.provider.clone(),
                user_id: key.user_id.clone(),
                waited,
            });
        }

        self.settle(key, grant_rx.try_recv().is_ok())
    }

    /// Final bookkeeping once a waiter has left its queue.
    fn settle(&self, key: &BucketKey, granted: bool) -> Result<(), RateLimitError> {
        if granted {
            self.metrics.record_queued_grant();
            debug!(provider = %key.provider, user_id = %key.user_id, "Queued request granted");
            Ok(())
        } else {
            self.metrics.record_cancellation();
            debug!(provider = %key.provider, user_id = %key.user_id, "Queued request cancelled by reset");
            Err(RateLimitError::Cancelled {
                provider: key.provider.clone(),
                user_id: key.user_id.clone(),
            })
        }
    }

    #[cfg(test)]
    pub(crate) fn bucket_tokens(&self, provider: &str, user_id: &str) -> Option<u32> {
        self.state
            .lock()
            .buckets
            .get(&BucketKey::new(provider, user_id))
            .map(|bucket| bucket.available_tokens)
    }
}

#[async_trait]
impl RateLimiter for TokenBucketRateLimiter {
    async fn acquire_with(
        &self,
        provider: &str,
        user_id: &str,
        options: AcquireOptions,
    ) -> Result<(), RateLimitError> {
        let profile = self.profile(provider)?;
        let timeout = options
            .timeout
            .unwrap_or_else(|| profile.timeout(self.default_timeout));
        let key = BucketKey::new(provider, user_id);
        let started = Instant::now();
        let deadline = started
            .checked_add(timeout)
            .unwrap_or_else(|| started + FAR_FUTURE);

        let (waiter_id, mut grant_rx, mut wake_at) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let now = Instant::now();

            let bucket = state
                .buckets
                .entry(key.clone())
                .or_insert_with(|| Bucket::full(&profile, now));
            bucket.refill(&profile, now);
            bucket.prune_abandoned();
            bucket.drain(&key, now);

            // Only an empty queue may be bypassed.
            if bucket.waiters.is_empty() && bucket.take_token() {
                let remaining = bucket.available_tokens;
                drop(guard);
                self.metrics.record_immediate_grant();
                trace!(
                    provider = %provider,
                    user_id = %user_id,
                    "Token granted, {} remaining",
                    remaining
                );
                return Ok(());
            }

            let waiter_id = state.next_waiter_id;
            state.next_waiter_id += 1;

            let (grant_tx, grant_rx) = oneshot::channel();
            bucket.waiters.push_back(Waiter {
                id: waiter_id,
                enqueued_at: now,
                grant: grant_tx,
            });

            debug!(
                provider = %provider,
                user_id = %user_id,
                "Bucket empty, queued at position {} with {:?} timeout",
                bucket.waiters.len(),
                timeout
            );

            let wake_at = bucket.next_token_at(&profile, now);
            (waiter_id, grant_rx, wake_at)
        };

        loop {
            tokio::select! {
                biased;

                granted = &mut grant_rx => {
                    return self.settle(&key, granted.is_ok());
                }

                _ = sleep_until(deadline) => {
                    return self.abandon(&key, &profile, waiter_id, &mut grant_rx, started);
                }

                _ = sleep_until(wake_at) => {
                    let mut state = self.state.lock();
                    let now = Instant::now();
                    wake_at = match state.buckets.get_mut(&key) {
                        Some(bucket) => {
                            bucket.refill(&profile, now);
                            bucket.drain(&key, now);
                            bucket.next_token_at(&profile, now)
                        }
                        // cleared by a reset, the grant channel is already closed
                        None => deadline,
                    };
                }
            }
        }
    }

    fn try_acquire(&self, provider: &str, user_id: &str) -> Result<bool, RateLimitError> {
        let profile = self.profile(provider)?;
        let key = BucketKey::new(provider, user_id);

        let acquired = {
            let mut state = self.state.lock();
            let now = Instant::now();
            let bucket = state
                .buckets
                .entry(key.clone())
                .or_insert_with(|| Bucket::full(&profile, now));
            bucket.refill(&profile, now);
            bucket.prune_abandoned();
            bucket.drain(&key, now);
            bucket.waiters.is_empty() && bucket.take_token()
        };

        if acquired {
            self.metrics.record_immediate_grant();
        } else {
            self.metrics.record_rejection();
            debug!(provider = %provider, user_id = %user_id, "No token available");
        }

        Ok(acquired)
    }
}
