//! Source adapters: one per external position provider.
//!
//! Each adapter wraps a provider-specific [`Feed`] in a [`FeedAdapter`],
//! which owns the circuit breaker, the fetch deadline, bounds filtering and
//! simulated mode. The orchestrator only sees the [`SourceAdapter`] trait.
//!
//! | Source          | Class    | Quality     |
//! |-----------------|----------|-------------|
//! | ADS-B Exchange  | aircraft | 0.95        |
//! | OpenSky         | aircraft | 0.80        |
//! | MarineTraffic   | vessel   | 0.90        |
//! | VesselFinder    | vessel   | 0.85        |
//! | AISHub          | vessel   | 0.70        |
//! | MyShipTracking  | vessel   | 0.60 - 0.70 |

pub mod aircraft;
mod factory;
mod feed;
pub mod fields;
mod health;
pub mod simulation;
mod types;
pub mod vessel;

pub use factory::{build_adapters, AdapterList, AdapterSet};
pub use feed::{Feed, FeedAdapter, MapContext, Payload};
pub use health::{
    Admission, AdapterHealthState, CircuitBreakerConfig, CircuitState, HealthSnapshot,
    DEFAULT_COOLDOWN, DEFAULT_FAILURE_THRESHOLD,
};
pub use simulation::{FleetView, SyntheticFleet, SyntheticTrack};
pub use types::{AdapterError, AdapterMode, BoxFuture, FetchOutcome, QualityBand, SourceAdapter};
