//! trackfuse - multi-source aircraft and vessel position fusion.
//!
//! Polls several independent position providers per entity class, normalizes
//! their payloads into canonical records and fuses reports of the same
//! entity into one best-available record per cycle.
//!
//! # Layout
//!
//! - [`record`]: canonical aircraft, vessel and fused records
//! - [`provider`]: HTTP transport
//! - [`adapter`]: one adapter per provider, with field mapping, circuit
//!   breaking and simulated mode
//! - [`orchestrator`]: concurrent per-cycle collection
//! - [`fusion`]: grouping and field-wise merge
//! - [`sink`]: raw batch storage interface
//! - [`service`]: the public collection entry point and status report
//! - [`config`], [`log`], [`telemetry`]: ambient plumbing

pub mod adapter;
pub mod config;
pub mod fusion;
pub mod log;
pub mod orchestrator;
pub mod provider;
pub mod record;
pub mod service;
pub mod sink;
pub mod telemetry;

pub use config::ConfigFile;
pub use record::{AircraftRecord, Bounds, FusedRecord, Position, SourceId, VesselRecord};
pub use service::{DataCollectionService, StatusReport};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
