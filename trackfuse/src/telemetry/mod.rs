//! Collection telemetry for observability.
//!
//! Lock-free counters updated by the orchestrators, read through a
//! point-in-time snapshot.
//!
//! ```text
//! Orchestrators ─────► CollectionMetrics ─────► TelemetrySnapshot ─────► status report, CLI
//!                      (atomic counters)        (point-in-time copy)
//! ```
//!
//! # Example
//!
//! ```
//! use trackfuse::telemetry::CollectionMetrics;
//!
//! let metrics = CollectionMetrics::new();
//! metrics.cycle_completed(12, false);
//! metrics.fusion_completed(9, 1);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.records_collected, 12);
//! assert_eq!(snapshot.fused_records, 9);
//! ```

mod metrics;
mod snapshot;

pub use metrics::CollectionMetrics;
pub use snapshot::TelemetrySnapshot;
