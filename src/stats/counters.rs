//! Atomic counters for bridge activity

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Counters for everything the bridge does
///
/// Shared via `Arc`; all updates are relaxed atomics, reads are a consistent
/// enough snapshot for logging and tests.
#[derive(Debug, Default)]
pub struct BridgeStats {
    /// Payloads pushed onto the relay queue
    frames_ingested: AtomicU64,
    /// Null-key delivery cycles skipped
    frames_skipped: AtomicU64,
    /// Payloads discarded by queue overflow (drop-oldest)
    frames_dropped: AtomicU64,
    /// Payloads accepted by at least one viewer's outbound buffer
    frames_broadcast: AtomicU64,
    /// Payloads dropped because they failed to decode
    decode_errors: AtomicU64,
    /// Currently connected viewers
    viewers_connected: AtomicI64,
    /// Viewers removed because a send to them failed
    viewer_send_failures: AtomicU64,
    /// Frames skipped for a single lagging viewer (outbound buffer full)
    frames_lagged: AtomicU64,
}

impl BridgeStats {
    /// Create a zeroed stats block
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame_ingested(&self) {
        self.frames_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_skipped(&self) {
        self.frames_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_broadcast(&self) {
        self.frames_broadcast.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_viewer_connected(&self) {
        self.viewers_connected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_viewer_disconnected(&self) {
        self.viewers_connected.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_viewer_send_failure(&self) {
        self.viewer_send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_lagged(&self) {
        self.frames_lagged.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_ingested: self.frames_ingested.load(Ordering::Relaxed),
            frames_skipped: self.frames_skipped.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_broadcast: self.frames_broadcast.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            viewers_connected: self.viewers_connected.load(Ordering::Relaxed),
            viewer_send_failures: self.viewer_send_failures.load(Ordering::Relaxed),
            frames_lagged: self.frames_lagged.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`BridgeStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_ingested: u64,
    pub frames_skipped: u64,
    pub frames_dropped: u64,
    pub frames_broadcast: u64,
    pub decode_errors: u64,
    pub viewers_connected: i64,
    pub viewer_send_failures: u64,
    pub frames_lagged: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = BridgeStats::new();

        stats.record_frame_ingested();
        stats.record_frame_ingested();
        stats.record_frame_dropped();
        stats.record_viewer_connected();
        stats.record_viewer_connected();
        stats.record_viewer_disconnected();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames_ingested, 2);
        assert_eq!(snapshot.frames_dropped, 1);
        assert_eq!(snapshot.viewers_connected, 1);
        assert_eq!(snapshot.frames_broadcast, 0);
    }
}
