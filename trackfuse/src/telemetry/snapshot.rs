//! Point-in-time copy of the collection counters.

use serde::Serialize;

/// Snapshot of [`CollectionMetrics`](super::CollectionMetrics).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub uptime_secs: f64,
    pub cycles: u64,
    /// Cycles in which every source of the class returned nothing.
    pub empty_cycles: u64,
    pub records_collected: u64,
    pub fusion_runs: u64,
    /// Records rejected by fusion (invalid position, identity or quality).
    pub records_dropped: u64,
    pub fused_records: u64,
    pub sink_batches: u64,
    pub sink_failures: u64,
    pub cycles_per_minute: f64,
}

impl TelemetrySnapshot {
    /// Share of cycles that produced at least one record.
    pub fn yield_rate(&self) -> Option<f64> {
        (self.cycles > 0).then(|| (self.cycles - self.empty_cycles) as f64 / self.cycles as f64)
    }
}
