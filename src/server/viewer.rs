//! Viewer connection set and per-viewer connection task

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::error::Result;

/// Set of currently connected viewers
///
/// Maps viewer id to the sender half of that viewer's outbound frame channel.
/// The delivery loop iterates a snapshot, so the lock is held only long
/// enough to copy the sender handles; insertion and removal never corrupt an
/// in-flight broadcast.
#[derive(Debug, Default)]
pub struct ViewerRegistry {
    viewers: Mutex<HashMap<u64, mpsc::Sender<Message>>>,
    next_id: AtomicU64,
}

impl ViewerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a viewer, returning its id
    pub fn register(&self, tx: mpsc::Sender<Message>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(id, tx);
        id
    }

    /// Remove a viewer from the set
    ///
    /// Returns whether the viewer was still present. Removal never affects
    /// delivery to other members.
    pub fn remove(&self, id: u64) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Snapshot of the current membership
    ///
    /// A viewer connecting during a broadcast need not receive that
    /// broadcast, but will be in every later snapshot.
    pub fn snapshot(&self) -> Vec<(u64, mpsc::Sender<Message>)> {
        self.lock()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect()
    }

    /// Number of currently connected viewers
    pub fn viewer_count(&self) -> usize {
        self.lock().len()
    }

    /// Drop every viewer
    ///
    /// Closes each viewer's outbound channel, which ends its connection task.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, mpsc::Sender<Message>>> {
        self.viewers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drive a single viewer connection until it ends
///
/// Forwards frames from the viewer's outbound channel to the socket, each
/// write bounded by `send_timeout`. Reads are only consumed to service
/// ping/pong and detect the peer closing; viewers are not expected to send
/// anything. The task does not watch the shutdown flag directly: shutdown
/// reaches it as the channel closing (the server clears the registry after
/// the delivery loop has drained), so frames already handed to this viewer
/// are written out before the close frame.
pub(crate) async fn run_viewer(
    viewer_id: u64,
    socket: WebSocketStream<TcpStream>,
    mut rx: mpsc::Receiver<Message>,
    send_timeout: Duration,
) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            outgoing = rx.recv() => {
                let Some(frame) = outgoing else {
                    // Removed from the registry (shutdown or eviction); all
                    // buffered frames have been written by this point.
                    // Best effort; the peer may already be gone.
                    let _ = tokio::time::timeout(send_timeout, ws_tx.send(Message::Close(None))).await;
                    return Ok(());
                };

                match tokio::time::timeout(send_timeout, ws_tx.send(frame)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => return Err(e.into()),
                    Err(_) => {
                        tracing::debug!(viewer_id, "Send timed out, dropping viewer");
                        return Ok(());
                    }
                }
            }

            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {} // ignore; reading drives ping/pong
                    Some(Err(e)) => return Err(e.into()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> mpsc::Sender<Message> {
        mpsc::channel(1).0
    }

    #[test]
    fn test_register_assigns_unique_ids() {
        let registry = ViewerRegistry::new();

        let a = registry.register(sender());
        let b = registry.register(sender());

        assert_ne!(a, b);
        assert_eq!(registry.viewer_count(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = ViewerRegistry::new();
        let id = registry.register(sender());

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert_eq!(registry.viewer_count(), 0);
    }

    #[test]
    fn test_snapshot_is_independent_of_later_mutation() {
        let registry = ViewerRegistry::new();
        let a = registry.register(sender());
        let _b = registry.register(sender());

        let snapshot = registry.snapshot();
        registry.remove(a);

        // The captured snapshot still holds both handles
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.viewer_count(), 1);
    }

    #[test]
    fn test_clear_empties_the_set() {
        let registry = ViewerRegistry::new();
        registry.register(sender());
        registry.register(sender());

        registry.clear();
        assert_eq!(registry.viewer_count(), 0);
    }
}
