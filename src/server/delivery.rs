//! Delivery loop: queue drain and fan-out

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::Message;

use crate::message;
use crate::queue::RelayQueue;
use crate::shutdown::Shutdown;
use crate::stats::BridgeStats;

use super::viewer::ViewerRegistry;

/// Run the delivery loop until shutdown
///
/// While the shutdown flag is clear: pop a payload, decode it, render it as
/// JSON and hand it to every viewer in the current snapshot; on an empty
/// queue, sleep `poll_interval` (raced against shutdown so the loop exits
/// within one interval). After shutdown triggers, payloads still in the
/// queue are drained to connected viewers for up to `drain_window`.
pub(crate) async fn run_delivery(
    queue: Arc<RelayQueue>,
    registry: Arc<ViewerRegistry>,
    stats: Arc<BridgeStats>,
    shutdown: Shutdown,
    poll_interval: Duration,
    drain_window: Duration,
) {
    while !shutdown.is_triggered() {
        match queue.try_pop() {
            Some(payload) => deliver(&payload, &registry, &stats),
            None => {
                tokio::select! {
                    _ = shutdown.triggered() => break,
                    _ = tokio::time::sleep(poll_interval) => {}
                }
            }
        }
    }

    // Best-effort drain of what was already queued at shutdown
    let deadline = tokio::time::Instant::now() + drain_window;
    while tokio::time::Instant::now() < deadline {
        match queue.try_pop() {
            Some(payload) => deliver(&payload, &registry, &stats),
            None => break,
        }
    }

    tracing::debug!(remaining = queue.len(), "Delivery loop stopped");
}

/// Decode one payload and fan it out to the viewer snapshot
///
/// Decode failures drop the payload; a per-viewer failure removes only that
/// viewer. Neither ends the loop.
fn deliver(payload: &Bytes, registry: &ViewerRegistry, stats: &BridgeStats) {
    let json = match message::render(payload) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, len = payload.len(), "Dropping undecodable payload");
            stats.record_decode_error();
            return;
        }
    };

    let mut delivered = 0usize;
    for (viewer_id, tx) in registry.snapshot() {
        match tx.try_send(Message::text(json.clone())) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => {
                // Viewer is lagging; skip this frame for it rather than block
                stats.record_frame_lagged();
                tracing::trace!(viewer_id, "Viewer outbound buffer full, frame skipped");
            }
            Err(TrySendError::Closed(_)) => {
                if registry.remove(viewer_id) {
                    stats.record_viewer_send_failure();
                    tracing::debug!(viewer_id, "Viewer send failed, removed from set");
                }
            }
        }
    }

    // Only frames at least one viewer accepted count as broadcast
    if delivered > 0 {
        stats.record_frame_broadcast();
    }
}
