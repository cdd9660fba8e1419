//! Pipeline-to-WebSocket relay bridge
//!
//! Consumes an ordered stream of serialized detection messages from an
//! upstream pipeline, buffers them in a bounded drop-oldest queue, and fans
//! each one out as a JSON text frame to every connected WebSocket viewer.
//!
//! # Architecture
//!
//! ```text
//! upstream stream ──► ingest loop ──► RelayQueue ──► delivery loop ──► N viewers
//!                        │               (drop-oldest,     │
//!                        │                capacity 10)     │
//!                        └────────── Shutdown ─────────────┘
//! ```
//!
//! The ingest loop and the broadcast server share nothing except the relay
//! queue and the shutdown flag. The queue never blocks its producer: when
//! full, the oldest payload is discarded. Shutdown is cooperative; every
//! loop observes the flag within one poll interval and unwinds.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ws_relay::{
//!     run_ingest, BridgeStats, ChannelSource, RelayQueue, RelayServer, ServerConfig, Shutdown,
//! };
//!
//! #[tokio::main]
//! async fn main() -> ws_relay::Result<()> {
//!     let queue = Arc::new(RelayQueue::new());
//!     let stats = Arc::new(BridgeStats::new());
//!     let shutdown = Shutdown::new();
//!
//!     let (feed, source) = ChannelSource::new(64);
//!     let _ = feed; // hand this to the upstream consumer
//!
//!     let ingest = tokio::spawn(run_ingest(
//!         source,
//!         Arc::clone(&queue),
//!         Arc::clone(&stats),
//!         shutdown.clone(),
//!     ));
//!
//!     let server = RelayServer::with_stats(
//!         ServerConfig::default(),
//!         queue,
//!         shutdown.clone(),
//!         stats,
//!     );
//!     let server = tokio::spawn(async move { server.run().await });
//!
//!     tokio::signal::ctrl_c().await?;
//!     shutdown.trigger();
//!
//!     server.await.expect("server task panicked")?;
//!     let _ = ingest.await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod ingest;
pub mod message;
pub mod queue;
pub mod server;
pub mod shutdown;
pub mod stats;

pub use error::{Error, Result};
pub use ingest::{run_ingest, ChannelSource, SourceRecord, StreamSource};
pub use message::SaeMessage;
pub use queue::RelayQueue;
pub use server::{RelayServer, ServerConfig, ViewerRegistry};
pub use shutdown::Shutdown;
pub use stats::{BridgeStats, StatsSnapshot};
