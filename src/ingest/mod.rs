//! Stream ingest
//!
//! Pulls `(key, payload)` records from the upstream stream source in order
//! and pushes the payloads into the relay queue. The source itself (Redis
//! stream consumer, message broker client, ...) lives behind the
//! [`StreamSource`] trait; reconnect and retry policy belong to the source
//! implementation, not to the ingest loop.

pub mod run;
pub mod source;

pub use run::run_ingest;
pub use source::{ChannelSource, SourceRecord, StreamSource};
