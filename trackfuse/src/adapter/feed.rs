//! Generic adapter shell around a provider-specific [`Feed`].
//!
//! A [`Feed`] knows one provider: how to build its request, how to split the
//! response body into items, and how to map one item into a canonical
//! record. [`FeedAdapter`] supplies everything else every adapter needs:
//! circuit breaking, the fetch deadline, bounds filtering, health
//! bookkeeping and simulated mode.
//!
//! ```text
//! admit ─► [live: HTTP GET | simulated: render fleet] ─► split ─► map ─► validate ─► bounds
//!   │                    (deadline)
//!   └── open ─► empty outcome, no network call
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use rand::Rng;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::health::{Admission, AdapterHealthState, HealthSnapshot};
use super::simulation::{FleetView, SyntheticFleet, SyntheticTrack};
use super::types::{
    AdapterError, AdapterMode, BoxFuture, FetchOutcome, QualityBand, SourceAdapter,
};
use crate::config::SourceConfig;
use crate::provider::{AsyncHttpClient, AsyncReqwestClient, HttpRequest};
use crate::record::{Bounds, PositionReport, SourceId};

/// Provider items extracted from one response body.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub items: Vec<Value>,
    /// Response-level timestamp, used when an item carries none.
    pub reported_at: Option<DateTime<Utc>>,
}

/// Inputs a mapper needs besides the item itself.
#[derive(Debug, Clone, Copy)]
pub struct MapContext {
    /// Timestamp for items without their own (or with relative ages).
    pub reference_time: DateTime<Utc>,
    /// Quality stamped on every mapped record.
    pub quality: f64,
}

impl MapContext {
    pub fn new(reference_time: DateTime<Utc>, quality: f64) -> Self {
        Self {
            reference_time,
            quality,
        }
    }
}

/// One provider's wire format and field mapping.
pub trait Feed: Send + Sync + 'static {
    type Record: PositionReport;

    fn source(&self) -> SourceId;

    /// Declared quality characteristic.
    fn quality(&self) -> QualityBand;

    /// Build the provider request for `bounds`.
    fn request(&self, config: &SourceConfig, bounds: &Bounds) -> HttpRequest;

    /// Endpoint label without credentials.
    fn endpoint(&self, config: &SourceConfig) -> String {
        config.base_url.clone()
    }

    /// Split a decoded body into per-entity items.
    fn split(&self, body: Value) -> Result<Payload, AdapterError>;

    /// Map one item. `None` when a mandatory field is missing or unusable.
    fn map(&self, item: &Value, context: &MapContext) -> Option<Self::Record>;

    /// Render synthetic tracks in this provider's wire format.
    fn render(&self, tracks: &[SyntheticTrack], at: DateTime<Utc>) -> Value;
}

enum Transport<C> {
    Live(C),
    Simulated(Arc<SyntheticFleet>),
}

/// A [`SourceAdapter`] built from a [`Feed`].
pub struct FeedAdapter<F: Feed, C: AsyncHttpClient = AsyncReqwestClient> {
    feed: F,
    transport: Transport<C>,
    config: SourceConfig,
    health: AdapterHealthState,
}

impl<F: Feed, C: AsyncHttpClient> FeedAdapter<F, C> {
    /// Adapter that calls the provider over `client`.
    pub fn live(feed: F, client: C, config: SourceConfig) -> Self {
        Self::with_transport(feed, Transport::Live(client), config)
    }

    /// Adapter that renders payloads from `fleet` instead of calling out.
    pub fn simulated(feed: F, fleet: Arc<SyntheticFleet>, config: SourceConfig) -> Self {
        Self::with_transport(feed, Transport::Simulated(fleet), config)
    }

    fn with_transport(feed: F, transport: Transport<C>, config: SourceConfig) -> Self {
        let health = AdapterHealthState::new(config.circuit_breaker());
        Self {
            feed,
            transport,
            config,
            health,
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn run_fetch(&self, bounds: &Bounds) -> FetchOutcome<F::Record> {
        let source = self.feed.source();

        if let Admission::ShortCircuit { retry_in } = self.health.admit() {
            debug!(
                source = %source,
                retry_in_ms = retry_in.as_millis() as u64,
                "Circuit open, skipping fetch"
            );
            return FetchOutcome::failed(AdapterError::CircuitOpen { retry_in }, Duration::ZERO);
        }

        let started = Instant::now();
        let attempt = AssertUnwindSafe(self.attempt(bounds))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(AdapterError::TaskFailed(panic_message(panic.as_ref())))
            });
        let elapsed = started.elapsed();

        match attempt {
            Ok((received, records)) => {
                self.health.record_success(records.len(), elapsed);
                debug!(
                    source = %source,
                    received,
                    records = records.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Fetch complete"
                );
                FetchOutcome::ok(records, elapsed)
            }
            Err(error) => {
                self.health.record_failure(&error.to_string(), elapsed);
                warn!(
                    source = %source,
                    error = %error,
                    transient = error.is_transient(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Fetch failed"
                );
                FetchOutcome::failed(error, elapsed)
            }
        }
    }

    /// Fetch, split and normalize. Returns the provider item count alongside
    /// the surviving records.
    async fn attempt(&self, bounds: &Bounds) -> Result<(usize, Vec<F::Record>), AdapterError> {
        let body = match tokio::time::timeout(self.config.timeout, self.obtain(bounds)).await {
            Ok(result) => result?,
            Err(_) => return Err(AdapterError::Timeout(self.config.timeout)),
        };
        let payload = self.feed.split(body)?;
        let received = payload.items.len();
        Ok((received, self.normalize(payload, bounds)))
    }

    async fn obtain(&self, bounds: &Bounds) -> Result<Value, AdapterError> {
        match &self.transport {
            Transport::Live(client) => {
                let request = self.feed.request(&self.config, bounds);
                let body = client.get(&request).await?;
                serde_json::from_slice(&body).map_err(|e| AdapterError::Malformed(e.to_string()))
            }
            Transport::Simulated(fleet) => {
                if roll(self.config.simulated_failure_rate) {
                    return Err(AdapterError::Simulated);
                }
                let now = Utc::now();
                let view = FleetView {
                    source: self.feed.source(),
                    coverage: self.config.simulated_coverage,
                };
                Ok(self.feed.render(&fleet.observe(view, now), now))
            }
        }
    }

    /// Map items, then drop invalid and out-of-bounds records.
    fn normalize(&self, payload: Payload, bounds: &Bounds) -> Vec<F::Record> {
        let band = self.feed.quality();
        let context = MapContext::new(
            payload.reported_at.unwrap_or_else(Utc::now),
            band.nominal(),
        );
        let jitter = self.mode() == AdapterMode::Simulated;
        let mut rng = rand::rng();

        let mut unmapped = 0usize;
        let mut invalid = 0usize;
        let mut outside = 0usize;
        let mut records = Vec::with_capacity(payload.items.len());

        for item in &payload.items {
            let Some(mut record) = self.feed.map(item, &context) else {
                unmapped += 1;
                continue;
            };
            let position = record.position();
            if !position.is_valid() {
                invalid += 1;
                continue;
            }
            if !bounds.contains(&position) {
                outside += 1;
                continue;
            }
            if jitter {
                record.set_data_quality(band.sample(&mut rng));
            }
            records.push(record);
        }

        if unmapped + invalid + outside > 0 {
            debug!(
                source = %self.feed.source(),
                unmapped,
                invalid_position = invalid,
                out_of_bounds = outside,
                "Dropped provider items"
            );
        }
        records
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panicked".to_string())
}

fn roll(probability: f64) -> bool {
    probability > 0.0 && rand::rng().random_bool(probability.min(1.0))
}

impl<F: Feed, C: AsyncHttpClient> SourceAdapter<F::Record> for FeedAdapter<F, C> {
    fn source(&self) -> SourceId {
        self.feed.source()
    }

    fn mode(&self) -> AdapterMode {
        match self.transport {
            Transport::Live(_) => AdapterMode::Live,
            Transport::Simulated(_) => AdapterMode::Simulated,
        }
    }

    fn endpoint(&self) -> String {
        match self.transport {
            Transport::Live(_) => self.feed.endpoint(&self.config),
            Transport::Simulated(_) => format!("simulated://{}", self.feed.source()),
        }
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    fn fetch<'a>(&'a self, bounds: &'a Bounds) -> BoxFuture<'a, FetchOutcome<F::Record>> {
        Box::pin(self.run_fetch(bounds))
    }

    fn health(&self) -> HealthSnapshot {
        self.health.snapshot()
    }

    fn record_failure(&self, error: &AdapterError, elapsed: Duration) {
        self.health.record_failure(&error.to_string(), elapsed);
    }
}
