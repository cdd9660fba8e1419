//! Broadcast server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent viewers (0 = unlimited)
    pub max_viewers: usize,

    /// Sleep between empty-queue polls in the delivery loop
    pub poll_interval: Duration,

    /// Per-viewer socket write timeout; a write exceeding it drops the viewer
    pub send_timeout: Duration,

    /// WebSocket handshake must complete within this time
    pub handshake_timeout: Duration,

    /// How long to keep draining queued payloads after shutdown triggers
    pub shutdown_drain: Duration,

    /// Capacity of each viewer's outbound frame buffer
    pub viewer_buffer: usize,

    /// Enable TCP_NODELAY on viewer sockets
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:12345".parse().unwrap(),
            max_viewers: 0, // Unlimited
            poll_interval: Duration::from_millis(10),
            send_timeout: Duration::from_secs(5),
            handshake_timeout: Duration::from_secs(10),
            shutdown_drain: Duration::from_millis(250),
            viewer_buffer: 32,
            tcp_nodelay: true,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum concurrent viewers
    pub fn max_viewers(mut self, max: usize) -> Self {
        self.max_viewers = max;
        self
    }

    /// Set the delivery loop poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-viewer send timeout
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the shutdown drain window
    pub fn shutdown_drain(mut self, window: Duration) -> Self {
        self.shutdown_drain = window;
        self
    }

    /// Set each viewer's outbound buffer capacity
    pub fn viewer_buffer(mut self, capacity: usize) -> Self {
        self.viewer_buffer = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 12345);
        assert_eq!(config.max_viewers, 0);
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.send_timeout, Duration::from_secs(5));
        assert_eq!(config.shutdown_drain, Duration::from_millis(250));
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:9001".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .max_viewers(50)
            .poll_interval(Duration::from_millis(5))
            .send_timeout(Duration::from_secs(1))
            .shutdown_drain(Duration::from_millis(100))
            .viewer_buffer(8);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.max_viewers, 50);
        assert_eq!(config.poll_interval, Duration::from_millis(5));
        assert_eq!(config.send_timeout, Duration::from_secs(1));
        assert_eq!(config.shutdown_drain, Duration::from_millis(100));
        assert_eq!(config.viewer_buffer, 8);
    }

    #[test]
    fn test_viewer_buffer_floor() {
        // A zero buffer would starve delivery entirely; clamp to 1
        let config = ServerConfig::default().viewer_buffer(0);

        assert_eq!(config.viewer_buffer, 1);
    }
}
