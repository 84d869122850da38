//! Per-client call counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters updated by every call of a client.
#[derive(Debug)]
pub struct ClientStats {
    calls_total: AtomicU64,
    calls_failed: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    created_at: Instant,
}

impl Default for ClientStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls_total: AtomicU64::new(0),
            calls_failed: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            created_at: Instant::now(),
        }
    }

    pub(crate) fn record_call(&self) {
        self.calls_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.calls_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_bytes_sent(&self, bytes: usize) {
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_bytes_received(&self, bytes: usize) {
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// A consistent-enough copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            calls_total: self.calls_total.load(Ordering::Relaxed),
            calls_failed: self.calls_failed.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            uptime: self.created_at.elapsed(),
        }
    }
}

/// Point-in-time view of [`ClientStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientStatsSnapshot {
    /// Calls started, including those rejected before dispatch
    pub calls_total: u64,
    /// Calls that returned errors
    pub calls_failed: u64,
    /// Request body bytes handed to the transport
    pub bytes_sent: u64,
    /// Response body bytes after decompression
    pub bytes_received: u64,
    pub uptime: Duration,
}

impl ClientStatsSnapshot {
    /// Share of calls that succeeded, 1.0 before the first call.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.calls_total == 0 {
            return 1.0;
        }
        let succeeded = self.calls_total.saturating_sub(self.calls_failed);
        succeeded as f64 / self.calls_total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_counts_failures() {
        let stats = ClientStats::new();
        assert_eq!(stats.snapshot().success_rate(), 1.0);

        stats.record_call();
        stats.record_call();
        stats.record_failure();
        stats.record_bytes_received(10);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.calls_total, 2);
        assert_eq!(snapshot.bytes_received, 10);
        assert!((snapshot.success_rate() - 0.5).abs() < f64::EPSILON);
    }
}
