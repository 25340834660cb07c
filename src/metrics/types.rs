// Standard library
use std::sync::Arc;
use std::time::Instant;

// 3rd party crates
use parking_lot::RwLock;

/// Counters for rate limiter decisions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LimiterMetrics {
    /// Number of acquisitions granted without queuing
    pub immediate_grants: u64,
    /// Number of acquisitions granted after waiting in a queue
    pub queued_grants: u64,
    /// Number of non-blocking attempts that found no token
    pub rejections: u64,
    /// Number of waiters that gave up after their timeout
    pub timeouts: u64,
    /// Number of waiters dropped by a reset
    pub cancellations: u64,
    /// Number of calls naming a provider without a profile
    pub unknown_providers: u64,
    /// Number of reset calls
    pub resets: u64,
    /// Last grant time
    pub last_grant: Option<Instant>,
    /// Last timeout time
    pub last_timeout: Option<Instant>,
}

/// Thread-safe metrics manager
#[derive(Debug, Default, Clone)]
pub struct MetricsManager {
    metrics: Arc<RwLock<LimiterMetrics>>,
}

impl MetricsManager {
    /// Creates a new MetricsManager
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(LimiterMetrics::default())),
        }
    }

    /// Records a token granted on the first attempt
    pub fn record_immediate_grant(&self) {
        let mut metrics = self.metrics.write();
        metrics.immediate_grants += 1;
        metrics.last_grant = Some(Instant::now());
    }

    /// Records a token granted to a queued waiter
    pub fn record_queued_grant(&self) {
        let mut metrics = self.metrics.write();
        metrics.queued_grants += 1;
        metrics.last_grant = Some(Instant::now());
    }

    pub fn record_rejection(&self) {
        self.metrics.write().rejections += 1;
    }

    /// Records a waiter timing out
    pub fn record_timeout(&self) {
        let mut metrics = self.metrics.write();
        metrics.timeouts += 1;
        metrics.last_timeout = Some(Instant::now());
    }

    pub fn record_cancellation(&self) {
        self.metrics.write().cancellations += 1;
    }

    pub fn record_unknown_provider(&self) {
        self.metrics.write().unknown_providers += 1;
    }

    pub fn record_reset(&self) {
        self.metrics.write().resets += 1;
    }

    /// Gets a snapshot of the current metrics
    pub fn get_snapshot(&self) -> LimiterMetrics {
        self.metrics.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_events() {
        let manager = MetricsManager::new();
        manager.record_immediate_grant();
        manager.record_queued_grant();
        manager.record_timeout();
        manager.record_timeout();

        let snapshot = manager.get_snapshot();
        assert_eq!(snapshot.immediate_grants, 1);
        assert_eq!(snapshot.queued_grants, 1);
        assert_eq!(snapshot.timeouts, 2);
        assert!(snapshot.last_grant.is_some());
        assert!(snapshot.last_timeout.is_some());
        assert_eq!(snapshot.resets, 0);
    }

    #[test]
    fn clones_share_counters() {
        let manager = MetricsManager::new();
        let clone = manager.clone();
        clone.record_reset();
        assert_eq!(manager.get_snapshot().resets, 1);
    }
}
