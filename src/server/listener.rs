//! WebSocket server listener
//!
//! Handles the TCP accept loop, spawns one task per viewer connection, and
//! owns the delivery task that drains the relay queue.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::queue::RelayQueue;
use crate::shutdown::Shutdown;
use crate::stats::BridgeStats;

use super::config::ServerConfig;
use super::delivery::run_delivery;
use super::viewer::{run_viewer, ViewerRegistry};

/// WebSocket broadcast server
///
/// Fans payloads from the relay queue out to every connected viewer. The
/// queue and shutdown handle are injected at construction so several
/// independent bridges can coexist in one process (and in one test).
pub struct RelayServer {
    config: ServerConfig,
    queue: Arc<RelayQueue>,
    registry: Arc<ViewerRegistry>,
    stats: Arc<BridgeStats>,
    shutdown: Shutdown,
}

impl RelayServer {
    /// Create a new server over the given queue and shutdown handle
    pub fn new(config: ServerConfig, queue: Arc<RelayQueue>, shutdown: Shutdown) -> Self {
        Self::with_stats(config, queue, shutdown, Arc::new(BridgeStats::new()))
    }

    /// Create a new server sharing an existing stats block
    pub fn with_stats(
        config: ServerConfig,
        queue: Arc<RelayQueue>,
        shutdown: Shutdown,
        stats: Arc<BridgeStats>,
    ) -> Self {
        Self {
            config,
            queue,
            registry: Arc::new(ViewerRegistry::new()),
            stats,
            shutdown,
        }
    }

    /// Get a reference to the viewer registry
    pub fn registry(&self) -> &Arc<ViewerRegistry> {
        &self.registry
    }

    /// Get a reference to the stats block
    pub fn stats(&self) -> &Arc<BridgeStats> {
        &self.stats
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until shutdown
    ///
    /// Useful for binding to an ephemeral port first. On shutdown the server
    /// stops accepting, lets the delivery loop drain within its window, then
    /// drops every viewer.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "Broadcast server listening");

        let delivery = tokio::spawn(run_delivery(
            Arc::clone(&self.queue),
            Arc::clone(&self.registry),
            Arc::clone(&self.stats),
            self.shutdown.clone(),
            self.config.poll_interval,
            self.config.shutdown_drain,
        ));

        let result = tokio::select! {
            _ = self.shutdown.triggered() => {
                tracing::info!("Broadcast server stopping, no longer accepting viewers");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        };

        // Give the delivery task its drain window, then stop waiting
        let drain_bound = self.config.shutdown_drain + self.config.poll_interval;
        if tokio::time::timeout(drain_bound * 2, delivery).await.is_err() {
            tracing::warn!("Delivery task did not stop within drain bound");
        }

        // Closing the outbound channels ends each viewer task once it has
        // written out its buffered frames, so the drain above is not raced.
        self.registry.clear();

        let snapshot = self.stats.snapshot();
        tracing::info!(
            frames_broadcast = snapshot.frames_broadcast,
            frames_dropped = snapshot.frames_dropped,
            decode_errors = snapshot.decode_errors,
            "Broadcast server stopped"
        );

        result
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check viewer limit
        if self.config.max_viewers > 0 && self.registry.viewer_count() >= self.config.max_viewers {
            tracing::warn!(peer = %peer_addr, "Viewer rejected: limit reached");
            return;
        }

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(error = %e, "Failed to configure socket");
                return;
            }
        }

        let registry = Arc::clone(&self.registry);
        let stats = Arc::clone(&self.stats);
        let handshake_timeout = self.config.handshake_timeout;
        let send_timeout = self.config.send_timeout;
        let viewer_buffer = self.config.viewer_buffer;

        tokio::spawn(async move {
            let handshake = tokio_tungstenite::accept_async(socket);
            let ws = match tokio::time::timeout(handshake_timeout, handshake).await {
                Ok(Ok(ws)) => ws,
                Ok(Err(e)) => {
                    tracing::debug!(peer = %peer_addr, error = %e, "WebSocket handshake failed");
                    return;
                }
                Err(_) => {
                    tracing::debug!(peer = %peer_addr, "WebSocket handshake timed out");
                    return;
                }
            };

            let (tx, rx) = mpsc::channel(viewer_buffer);
            let viewer_id = registry.register(tx);
            stats.record_viewer_connected();
            tracing::info!(viewer_id, peer = %peer_addr, "Viewer connected");

            if let Err(e) = run_viewer(viewer_id, ws, rx, send_timeout).await {
                tracing::debug!(viewer_id, error = %e, "Viewer connection error");
            }

            registry.remove(viewer_id);
            stats.record_viewer_disconnected();
            tracing::info!(viewer_id, peer = %peer_addr, "Viewer disconnected");
        });
    }
}
