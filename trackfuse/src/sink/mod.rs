//! Raw data sink: where per-source record batches go for audit storage.
//!
//! The orchestrator hands every non-empty source result to a
//! [`RawDataSink`] before fusion. Calls are fire-and-forget: each `store`
//! runs on its own task and a failure is logged, never propagated.
//!
//! Implementations must tolerate concurrent `store` calls from several
//! sources in the same cycle.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::adapter::BoxFuture;
use crate::record::{PositionReport, SourceId};

/// Errors a sink may report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The backing store cannot be reached.
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    /// The store refused the batch.
    #[error("batch from {origin} rejected: {reason}")]
    Rejected { origin: SourceId, reason: String },
}

/// One source's records for one cycle, tagged for audit.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBatch<R> {
    pub source: SourceId,
    pub records: Vec<R>,
    /// Endpoint the records came from (`simulated://...` in simulated mode).
    pub endpoint: String,
    /// Fetch latency.
    pub elapsed_ms: u64,
}

/// Destination for raw per-source records.
pub trait RawDataSink<R: PositionReport>: Send + Sync {
    fn store(&self, batch: RawBatch<R>) -> BoxFuture<'_, Result<(), SinkError>>;
}

/// Logs a one-line summary of each batch at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRawSink;

impl<R: PositionReport> RawDataSink<R> for TracingRawSink {
    fn store(&self, batch: RawBatch<R>) -> BoxFuture<'_, Result<(), SinkError>> {
        Box::pin(async move {
            debug!(
                source = %batch.source,
                class = %R::CLASS,
                records = batch.records.len(),
                endpoint = %batch.endpoint,
                elapsed_ms = batch.elapsed_ms,
                "Stored raw batch"
            );
            Ok(())
        })
    }
}

/// Discards every batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRawSink;

impl<R: PositionReport> RawDataSink<R> for NullRawSink {
    fn store(&self, _batch: RawBatch<R>) -> BoxFuture<'_, Result<(), SinkError>> {
        Box::pin(async { Ok(()) })
    }
}

/// Keeps batches in memory. Useful for embedding and tests.
pub struct MemoryRawSink<R> {
    batches: Mutex<Vec<RawBatch<R>>>,
}

impl<R> MemoryRawSink<R> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(Vec::new()),
        })
    }

    pub fn len(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.lock().is_empty()
    }
}

impl<R: Clone> MemoryRawSink<R> {
    /// Copy of everything stored so far.
    pub fn batches(&self) -> Vec<RawBatch<R>> {
        self.batches.lock().clone()
    }
}

impl<R> fmt::Debug for MemoryRawSink<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRawSink")
            .field("batches", &self.len())
            .finish()
    }
}

impl<R: PositionReport> RawDataSink<R> for MemoryRawSink<R> {
    fn store(&self, batch: RawBatch<R>) -> BoxFuture<'_, Result<(), SinkError>> {
        self.batches.lock().push(batch);
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Position, VesselRecord};
    use chrono::Utc;

    fn batch() -> RawBatch<VesselRecord> {
        RawBatch {
            source: SourceId::AisHub,
            records: vec![VesselRecord::new(
                "123",
                Position::new(52.0, 4.0),
                Utc::now(),
                SourceId::AisHub,
                0.7,
            )],
            endpoint: "simulated://aishub".into(),
            elapsed_ms: 12,
        }
    }

    #[tokio::test]
    async fn test_memory_sink_keeps_batches() {
        let sink = MemoryRawSink::new();
        sink.store(batch()).await.unwrap();
        sink.store(batch()).await.unwrap();

        assert_eq!(sink.len(), 2);
        let stored = sink.batches();
        assert_eq!(stored[0].records[0].mmsi, "123");
        assert_eq!(stored[1].endpoint, "simulated://aishub");
    }

    #[tokio::test]
    async fn test_trivial_sinks_accept() {
        assert!(TracingRawSink.store(batch()).await.is_ok());
        assert!(NullRawSink.store(batch()).await.is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = SinkError::Rejected {
            origin: SourceId::OpenSky,
            reason: "quota".into(),
        };
        assert_eq!(err.to_string(), "batch from opensky rejected: quota");
    }
}
