//! Bounded relay queue
//!
//! The relay queue decouples the ingest loop from the broadcast server. It is
//! a fixed-capacity FIFO of opaque payloads with a drop-oldest overflow
//! policy: a push into a full queue discards the head element first and never
//! blocks the producer. Consumers poll with [`RelayQueue::try_pop`], sleeping
//! a short interval between attempts so a shutdown request is observed
//! promptly.

pub mod ring;

pub use ring::{RelayQueue, DEFAULT_CAPACITY};
