//! Ingest loop

use std::sync::Arc;

use crate::error::Result;
use crate::queue::RelayQueue;
use crate::shutdown::Shutdown;
use crate::stats::BridgeStats;

use super::source::StreamSource;

/// Run the ingest loop until shutdown or source exhaustion
///
/// Each iteration races the next source read against the shutdown signal, so
/// the loop exits within one read cycle of the flag being set. Records with a
/// null key are skipped without enqueuing. Queue overflow is not an error:
/// the oldest payload is silently discarded and counted.
pub async fn run_ingest<S: StreamSource>(
    mut source: S,
    queue: Arc<RelayQueue>,
    stats: Arc<BridgeStats>,
    shutdown: Shutdown,
) -> Result<()> {
    loop {
        if shutdown.is_triggered() {
            tracing::debug!("Ingest loop stopping on shutdown");
            return Ok(());
        }

        let record = tokio::select! {
            _ = shutdown.triggered() => {
                tracing::debug!("Ingest loop stopping on shutdown");
                return Ok(());
            }
            record = source.next_record() => record?,
        };

        let Some(record) = record else {
            tracing::info!("Stream source exhausted, ingest loop stopping");
            return Ok(());
        };

        let Some(key) = record.key else {
            stats.record_frame_skipped();
            continue;
        };

        if let Some(_discarded) = queue.push(record.payload) {
            stats.record_frame_dropped();
            tracing::trace!(stream = %key, "Relay queue full, oldest payload discarded");
        }
        stats.record_frame_ingested();
    }
}
