//! WebSocket broadcast server
//!
//! Accepts viewer connections on a configured address and fans every payload
//! drained from the relay queue out to all connected viewers as a JSON text
//! frame.
//!
//! # Architecture
//!
//! ```text
//!                         Arc<ViewerRegistry>
//!                   ┌──────────────────────────┐
//!                   │ viewers: HashMap<id,     │
//!                   │   mpsc::Sender<Message>> │
//!                   └────────────┬─────────────┘
//!                                │ snapshot()
//!        RelayQueue ──try_pop──► delivery loop ──try_send──┐
//!                                                          │
//!              ┌───────────────────────┬───────────────────┤
//!              ▼                       ▼                   ▼
//!        [viewer task]           [viewer task]       [viewer task]
//!        rx.recv()               rx.recv()           rx.recv()
//!              │                       │                   │
//!              └──► ws_tx.send() ──► TCP (one text frame per message)
//! ```
//!
//! Acceptance, delivery and per-viewer writes are separate tasks: a slow or
//! dead viewer can neither stall new connections nor block the queue drain.
//! The only coupling is the per-viewer bounded channel; when it is full the
//! frame is skipped for that viewer, and when it is closed the viewer is
//! removed from the set.

pub mod config;
pub mod delivery;
pub mod listener;
pub mod viewer;

pub use config::ServerConfig;
pub use listener::RelayServer;
pub use viewer::ViewerRegistry;
