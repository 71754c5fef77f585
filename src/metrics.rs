//! Controller counters for diagnostics.
//!
//! Counters are plain relaxed atomics: they are observability data, not
//! synchronization. The commit guard itself never consults them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters maintained by one controller.
#[derive(Debug, Default)]
pub struct ControllerMetrics {
    invocations_started: AtomicU64,
    rerun_requests: AtomicU64,
    commits_succeeded: AtomicU64,
    commits_failed: AtomicU64,
    results_superseded: AtomicU64,
    results_discarded: AtomicU64,
}

impl ControllerMetrics {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_started(&self) {
        self.invocations_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rerun_request(&self) {
        self.rerun_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit_succeeded(&self) {
        self.commits_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit_failed(&self) {
        self.commits_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_superseded(&self) {
        self.results_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self) {
        self.results_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            invocations_started: self.invocations_started.load(Ordering::Relaxed),
            rerun_requests: self.rerun_requests.load(Ordering::Relaxed),
            commits_succeeded: self.commits_succeeded.load(Ordering::Relaxed),
            commits_failed: self.commits_failed.load(Ordering::Relaxed),
            results_superseded: self.results_superseded.load(Ordering::Relaxed),
            results_discarded: self.results_discarded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`ControllerMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Invocations handed to the producer.
    pub invocations_started: u64,
    /// Explicit rerun requests received.
    pub rerun_requests: u64,
    /// Settlements committed as `Succeeded`.
    pub commits_succeeded: u64,
    /// Settlements committed as `Failed`.
    pub commits_failed: u64,
    /// Settlements dropped because a newer invocation was issued.
    pub results_superseded: u64,
    /// Settlements dropped because the context was torn down.
    pub results_discarded: u64,
}

impl MetricsSnapshot {
    /// Total settlements that were observed but not committed.
    #[must_use]
    pub const fn total_dropped(&self) -> u64 {
        self.results_superseded + self.results_discarded
    }
}
