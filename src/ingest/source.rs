//! Upstream stream source abstraction

use std::future::Future;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::Result;

/// One delivery cycle from the upstream source
#[derive(Debug, Clone)]
pub struct SourceRecord {
    /// Stream key the payload arrived on
    ///
    /// `None` means "no data this cycle" (a transient-read artifact of some
    /// transports); such records are skipped by the ingest loop, never
    /// enqueued.
    pub key: Option<String>,

    /// Opaque serialized message
    pub payload: Bytes,
}

impl SourceRecord {
    /// Create a record carrying data on the given stream key
    pub fn new(key: impl Into<String>, payload: Bytes) -> Self {
        Self {
            key: Some(key.into()),
            payload,
        }
    }

    /// Create an empty "no data this cycle" record
    pub fn empty() -> Self {
        Self {
            key: None,
            payload: Bytes::new(),
        }
    }
}

/// An ordered source of `(key, payload)` records
///
/// Implementations wrap the actual stream transport. `Ok(None)` means the
/// source is exhausted and the ingest loop should stop; an `Err` means the
/// source failed unrecoverably (whatever retrying the transport supports has
/// already happened inside the implementation).
pub trait StreamSource: Send {
    /// Obtain the next record, waiting if none is available yet
    fn next_record(&mut self) -> impl Future<Output = Result<Option<SourceRecord>>> + Send;
}

/// Channel-backed source
///
/// Feeds the ingest loop from an in-process `mpsc` channel. Used by tests and
/// demos; production deployments put the real transport consumer behind
/// [`StreamSource`] instead.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<SourceRecord>,
}

impl ChannelSource {
    /// Create a source and the sender half that feeds it
    pub fn new(buffer: usize) -> (mpsc::Sender<SourceRecord>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx })
    }
}

impl StreamSource for ChannelSource {
    async fn next_record(&mut self) -> Result<Option<SourceRecord>> {
        // Channel closed means the producer is gone: source exhausted.
        Ok(self.rx.recv().await)
    }
}
