//! Atomic collection counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::snapshot::TelemetrySnapshot;

/// Counters shared by the aircraft and vessel orchestrators.
#[derive(Debug)]
pub struct CollectionMetrics {
    started: Instant,
    cycles: AtomicU64,
    empty_cycles: AtomicU64,
    records_collected: AtomicU64,
    fusion_runs: AtomicU64,
    records_dropped: AtomicU64,
    fused_records: AtomicU64,
    sink_batches: AtomicU64,
    sink_failures: AtomicU64,
}

impl Default for CollectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            cycles: AtomicU64::new(0),
            empty_cycles: AtomicU64::new(0),
            records_collected: AtomicU64::new(0),
            fusion_runs: AtomicU64::new(0),
            records_dropped: AtomicU64::new(0),
            fused_records: AtomicU64::new(0),
            sink_batches: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
        }
    }

    /// A collection cycle finished with `records` collected across sources.
    pub fn cycle_completed(&self, records: usize, all_empty: bool) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.records_collected
            .fetch_add(records as u64, Ordering::Relaxed);
        if all_empty {
            self.empty_cycles.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// The fusion engine ran and emitted `fused` records, dropping `dropped`.
    pub fn fusion_completed(&self, fused: usize, dropped: usize) {
        self.fusion_runs.fetch_add(1, Ordering::Relaxed);
        self.fused_records.fetch_add(fused as u64, Ordering::Relaxed);
        self.records_dropped
            .fetch_add(dropped as u64, Ordering::Relaxed);
    }

    pub fn sink_stored(&self) {
        self.sink_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sink_failed(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of times fusion has run.
    pub fn fusion_runs(&self) -> u64 {
        self.fusion_runs.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let uptime = self.started.elapsed();
        let cycles = self.cycles.load(Ordering::Relaxed);
        let uptime_secs = uptime.as_secs_f64();
        TelemetrySnapshot {
            uptime_secs,
            cycles,
            empty_cycles: self.empty_cycles.load(Ordering::Relaxed),
            records_collected: self.records_collected.load(Ordering::Relaxed),
            fusion_runs: self.fusion_runs.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            fused_records: self.fused_records.load(Ordering::Relaxed),
            sink_batches: self.sink_batches.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            cycles_per_minute: if uptime_secs > 0.0 {
                cycles as f64 * 60.0 / uptime_secs
            } else {
                0.0
            },
        }
    }
}
