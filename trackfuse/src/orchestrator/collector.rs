//! The per-class collection orchestrator.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::types::{ClassStatus, SourceResult};
use crate::adapter::{AdapterError, AdapterList, FetchOutcome, SourceAdapter};
use crate::fusion::FusionEngine;
use crate::record::{Bounds, FusedRecord, PositionReport};
use crate::sink::{RawBatch, RawDataSink};
use crate::telemetry::CollectionMetrics;

/// Extra time granted past an adapter's own timeout before the orchestrator
/// abandons its task.
pub const DEFAULT_TIMEOUT_GRACE: Duration = Duration::from_millis(250);

/// Collects from every adapter of one entity class and fuses the result.
///
/// Adapter failures never reach the caller. A source that errors, times out
/// or panics contributes zero records; its siblings are unaffected.
pub struct CollectionOrchestrator<R: PositionReport> {
    adapters: AdapterList<R>,
    sink: Arc<dyn RawDataSink<R>>,
    fusion: FusionEngine,
    metrics: Arc<CollectionMetrics>,
    status: Mutex<ClassStatus>,
    grace: Duration,
}

impl<R: PositionReport> CollectionOrchestrator<R> {
    pub fn new(
        adapters: AdapterList<R>,
        sink: Arc<dyn RawDataSink<R>>,
        fusion: FusionEngine,
        metrics: Arc<CollectionMetrics>,
    ) -> Self {
        Self {
            adapters,
            sink,
            fusion,
            metrics,
            status: Mutex::new(ClassStatus::new(R::CLASS)),
            grace: DEFAULT_TIMEOUT_GRACE,
        }
    }

    /// Override the grace period past each adapter's timeout.
    pub fn with_timeout_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter<R>>] {
        &self.adapters
    }

    pub fn class_status(&self) -> ClassStatus {
        self.status.lock().clone()
    }

    pub fn metrics(&self) -> &Arc<CollectionMetrics> {
        &self.metrics
    }

    /// Run one cycle: fetch from every adapter, forward raw batches to the
    /// sink and return the union of all records.
    pub async fn collect_all(&self, bounds: &Bounds) -> Vec<R> {
        let started = Instant::now();
        let results = self.fetch_every(bounds).await;

        self.forward_to_sink(&results);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.status.lock().record_cycle(&results, elapsed_ms);

        let records: Vec<R> = results
            .into_iter()
            .flat_map(|result| result.outcome.records)
            .collect();
        self.metrics
            .cycle_completed(records.len(), records.is_empty());

        if records.is_empty() {
            warn!(
                class = %R::CLASS,
                sources = self.adapters.len(),
                "No source returned data this cycle"
            );
        }
        records
    }

    /// Run one cycle and fuse it. Fusion is skipped when every source came
    /// back empty.
    pub async fn collect_and_fuse(&self, bounds: &Bounds) -> Vec<FusedRecord<R>> {
        let records = self.collect_all(bounds).await;
        if records.is_empty() {
            return Vec::new();
        }

        let collected = records.len();
        let output = self.fusion.merge_with_stats(records);
        self.metrics
            .fusion_completed(output.fused.len(), output.stats.dropped());
        self.status.lock().last_fused = output.fused.len();

        info!(
            class = %R::CLASS,
            collected,
            fused = output.fused.len(),
            merged = output.stats.merged_groups,
            dropped = output.stats.dropped(),
            "Cycle fused"
        );
        output.fused
    }

    /// Launch every adapter on its own task and wait for all of them.
    async fn fetch_every(&self, bounds: &Bounds) -> Vec<SourceResult<R>> {
        let fetches = self.adapters.iter().map(|adapter| {
            let source = adapter.source();
            let endpoint = adapter.endpoint();
            let deadline = adapter.timeout() + self.grace;
            let adapter = Arc::clone(adapter);
            let bounds = *bounds;

            async move {
                let started = Instant::now();
                let worker = Arc::clone(&adapter);
                let mut task = tokio::spawn(async move { worker.fetch(&bounds).await });

                let outcome = match tokio::time::timeout(deadline, &mut task).await {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(join_error)) => {
                        warn!(source = %source, error = %join_error, "Fetch task failed");
                        let error = AdapterError::TaskFailed(join_error.to_string());
                        let elapsed = started.elapsed();
                        adapter.record_failure(&error, elapsed);
                        FetchOutcome::failed(error, elapsed)
                    }
                    Err(_) => {
                        task.abort();
                        warn!(
                            source = %source,
                            deadline_ms = deadline.as_millis() as u64,
                            "Fetch abandoned past deadline"
                        );
                        let error = AdapterError::Timeout(deadline);
                        let elapsed = started.elapsed();
                        adapter.record_failure(&error, elapsed);
                        FetchOutcome::failed(error, elapsed)
                    }
                };

                SourceResult {
                    source,
                    endpoint,
                    outcome,
                }
            }
        });

        join_all(fetches).await
    }

    /// Hand each non-empty result to the sink on a detached task.
    fn forward_to_sink(&self, results: &[SourceResult<R>]) {
        for result in results.iter().filter(|r| !r.outcome.is_empty()) {
            let batch = RawBatch {
                source: result.source,
                records: result.outcome.records.clone(),
                endpoint: result.endpoint.clone(),
                elapsed_ms: result.outcome.elapsed.as_millis() as u64,
            };
            let sink = Arc::clone(&self.sink);
            let metrics = Arc::clone(&self.metrics);

            tokio::spawn(async move {
                let source = batch.source;
                let records = batch.records.len();
                match sink.store(batch).await {
                    Ok(()) => {
                        metrics.sink_stored();
                        debug!(source = %source, records, "Raw batch forwarded");
                    }
                    Err(error) => {
                        metrics.sink_failed();
                        warn!(source = %source, error = %error, "Raw sink rejected batch");
                    }
                }
            });
        }
    }
}
