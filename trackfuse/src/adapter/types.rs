//! Core adapter types: the [`SourceAdapter`] trait, fetch outcomes and the
//! per-fetch error taxonomy.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use super::health::HealthSnapshot;
use crate::provider::ProviderError;
use crate::record::{Bounds, PositionReport, SourceId};

/// A boxed future that is Send.
///
/// Used for dyn-compatible async trait methods, so the orchestrator can hold
/// `Arc<dyn SourceAdapter<R>>` for heterogeneous adapters.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Why a single fetch produced no records.
///
/// None of these escape the orchestrator; they are logged, counted in the
/// adapter's health state and surfaced through the status report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    /// Transport failure or non-2xx response.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Body was not the JSON shape the provider documents.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Circuit breaker is open; no network call was made.
    #[error("circuit open, retry in {}ms", retry_in.as_millis())]
    CircuitOpen { retry_in: Duration },

    /// The whole fetch exceeded its deadline.
    #[error("fetch timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The fetch task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    TaskFailed(String),

    /// Injected failure in simulated mode.
    #[error("simulated provider failure")]
    Simulated,
}

impl AdapterError {
    /// Short-circuits are not failures of the provider and do not count
    /// against the breaker.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, AdapterError::CircuitOpen { .. })
    }

    /// Whether the next cycle has a fair chance of succeeding. Client errors
    /// and payloads in the wrong shape usually mean bad configuration.
    pub fn is_transient(&self) -> bool {
        match self {
            AdapterError::Provider(error) => error.is_transient(),
            AdapterError::Malformed(_) | AdapterError::CircuitOpen { .. } => false,
            AdapterError::Timeout(_) | AdapterError::TaskFailed(_) | AdapterError::Simulated => {
                true
            }
        }
    }
}

/// Result of one adapter fetch: records plus a non-fatal error.
///
/// `records` is always empty when `error` is set.
#[derive(Debug, Clone)]
pub struct FetchOutcome<R> {
    pub records: Vec<R>,
    pub error: Option<AdapterError>,
    pub elapsed: Duration,
}

impl<R> FetchOutcome<R> {
    pub fn ok(records: Vec<R>, elapsed: Duration) -> Self {
        Self {
            records,
            error: None,
            elapsed,
        }
    }

    pub fn failed(error: AdapterError, elapsed: Duration) -> Self {
        Self {
            records: Vec::new(),
            error: Some(error),
            elapsed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// How an adapter obtains its payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterMode {
    Live,
    Simulated,
}

impl fmt::Display for AdapterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterMode::Live => write!(f, "live"),
            AdapterMode::Simulated => write!(f, "simulated"),
        }
    }
}

/// The data quality a source declares for its records.
///
/// Fixed-quality sources have `min == max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityBand {
    pub min: f64,
    pub max: f64,
}

impl QualityBand {
    pub const fn fixed(quality: f64) -> Self {
        Self {
            min: quality,
            max: quality,
        }
    }

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Midpoint of the band, assigned by the mapper.
    pub fn nominal(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Uniform draw within the band.
    pub fn sample<G: Rng + ?Sized>(&self, rng: &mut G) -> f64 {
        if self.max <= self.min {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }

    pub fn contains(&self, quality: f64) -> bool {
        quality >= self.min && quality <= self.max
    }
}

/// One external data provider, as the orchestrator sees it.
///
/// `fetch` never fails past its own boundary: transport errors, timeouts,
/// malformed payloads and open circuits all come back as an empty
/// [`FetchOutcome`] carrying the error.
pub trait SourceAdapter<R: PositionReport>: Send + Sync {
    fn source(&self) -> SourceId;

    fn mode(&self) -> AdapterMode;

    /// Endpoint description for the raw sink and logs. Never includes
    /// credentials.
    fn endpoint(&self) -> String;

    /// Deadline for one fetch, including the network call.
    fn timeout(&self) -> Duration;

    /// Fetch, map and bounds-filter one batch.
    fn fetch<'a>(&'a self, bounds: &'a Bounds) -> BoxFuture<'a, FetchOutcome<R>>;

    fn health(&self) -> HealthSnapshot;

    /// Charge a failure the adapter could not observe itself, such as its
    /// task being abandoned by the orchestrator.
    fn record_failure(&self, error: &AdapterError, elapsed: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_quality_band_nominal() {
        assert_eq!(QualityBand::fixed(0.95).nominal(), 0.95);
        assert!((QualityBand::new(0.60, 0.70).nominal() - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_quality_band_sample_stays_in_band() {
        let band = QualityBand::new(0.60, 0.70);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(band.contains(band.sample(&mut rng)));
        }
        assert_eq!(QualityBand::fixed(0.8).sample(&mut rng), 0.8);
    }

    #[test]
    fn test_transient_errors() {
        let unavailable = AdapterError::Provider(ProviderError::Status {
            status: 503,
            url: String::new(),
        });
        let unauthorized = AdapterError::Provider(ProviderError::Status {
            status: 401,
            url: String::new(),
        });
        assert!(unavailable.is_transient());
        assert!(!unauthorized.is_transient());
        assert!(AdapterError::Timeout(Duration::from_secs(2)).is_transient());
        assert!(!AdapterError::Malformed("not json".into()).is_transient());
    }

    #[test]
    fn test_fetch_outcome_constructors() {
        let ok: FetchOutcome<u8> = FetchOutcome::ok(vec![1, 2], Duration::from_millis(3));
        assert!(ok.error.is_none());
        assert!(!ok.is_empty());

        let failed: FetchOutcome<u8> =
            FetchOutcome::failed(AdapterError::Simulated, Duration::from_millis(3));
        assert!(failed.is_empty());
        assert_eq!(failed.error, Some(AdapterError::Simulated));
    }

    #[test]
    fn test_circuit_open_classification() {
        let open = AdapterError::CircuitOpen {
            retry_in: Duration::from_secs(5),
        };
        assert!(open.is_circuit_open());
        assert_eq!(open.to_string(), "circuit open, retry in 5000ms");
        assert!(!AdapterError::Malformed("x".into()).is_circuit_open());
    }
}
