//! In-process counters for dispatch and result traffic

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    dispatches_accepted: AtomicU64,
    dispatches_rejected: AtomicU64,
    tasks_sent: AtomicU64,
    tasks_failed: AtomicU64,
    results_saved: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch_accepted(&self) {
        self.dispatches_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "dispatches_accepted", "Metric incremented");
    }

    pub fn dispatch_rejected(&self) {
        self.dispatches_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "dispatches_rejected", "Metric incremented");
    }

    /// Record one dispatch: `sent` sends issued, `failed` of them unsuccessful
    pub fn tasks_delivered(&self, sent: usize, failed: usize) {
        self.tasks_sent.fetch_add(sent as u64, Ordering::Relaxed);
        self.tasks_failed.fetch_add(failed as u64, Ordering::Relaxed);
        tracing::debug!(sent, failed, "Task counters updated");
    }

    pub fn result_saved(&self) {
        self.results_saved.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "results_saved", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatches_accepted: self.dispatches_accepted.load(Ordering::Relaxed),
            dispatches_rejected: self.dispatches_rejected.load(Ordering::Relaxed),
            tasks_sent: self.tasks_sent.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            results_saved: self.results_saved.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub dispatches_accepted: u64,
    pub dispatches_rejected: u64,
    pub tasks_sent: u64,
    pub tasks_failed: u64,
    pub results_saved: u64,
}
