//! Cooperative shutdown signal
//!
//! A single process-wide flag flipped exactly once on termination. Every loop
//! in the bridge (ingest, delivery, accept, per-viewer) either polls
//! [`Shutdown::is_triggered`] once per iteration or races its blocking call
//! against [`Shutdown::triggered`] in a `tokio::select!`.
//!
//! The flag is one-way: once triggered it never resets for the lifetime of
//! the process. Triggering is idempotent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cloneable handle to the process-wide shutdown flag
///
/// All clones observe the same flag. Cheap to clone (a single `Arc`).
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    triggered: AtomicBool,
    notify: Notify,
}

impl Shutdown {
    /// Create a new shutdown handle in the running (not triggered) state
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger shutdown
    ///
    /// Idempotent: only the first call flips the flag and wakes waiters.
    pub fn trigger(&self) {
        if !self.inner.triggered.swap(true, Ordering::AcqRel) {
            tracing::info!("Shutdown triggered");
            self.inner.notify.notify_waiters();
        }
    }

    /// Check whether shutdown has been triggered
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Wait until shutdown is triggered
    ///
    /// Resolves immediately if the flag is already set. Designed for use in
    /// `tokio::select!` alongside blocking reads and accepts.
    pub async fn triggered(&self) {
        if self.is_triggered() {
            return;
        }

        let notified = self.inner.notify.notified();
        tokio::pin!(notified);

        // Register interest before the final flag check so a trigger racing
        // with this call cannot be missed.
        notified.as_mut().enable();

        if self.is_triggered() {
            return;
        }

        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_starts_clear() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_triggered());
    }

    #[test]
    fn test_trigger_is_one_way() {
        let shutdown = Shutdown::new();

        shutdown.trigger();
        assert!(shutdown.is_triggered());

        // A second trigger must not reset anything
        shutdown.trigger();
        assert!(shutdown.is_triggered());
    }

    #[test]
    fn test_clones_share_flag() {
        let shutdown = Shutdown::new();
        let clone = shutdown.clone();

        clone.trigger();
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_resolves_immediately_when_set() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        // Must not hang
        tokio::time::timeout(Duration::from_millis(100), shutdown.triggered())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_triggered_wakes_waiter() {
        let shutdown = Shutdown::new();
        let waiter = shutdown.clone();

        let handle = tokio::spawn(async move {
            waiter.triggered().await;
        });

        // Give the waiter a chance to register
        tokio::time::sleep(Duration::from_millis(10)).await;
        shutdown.trigger();

        tokio::time::timeout(Duration::from_millis(200), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
