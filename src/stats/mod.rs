//! Bridge statistics
//!
//! Cheap atomic counters shared across the ingest loop, delivery loop and
//! viewer tasks. Exporting them (Prometheus etc.) is an external concern;
//! this module only counts.

pub mod counters;

pub use counters::{BridgeStats, StatsSnapshot};
