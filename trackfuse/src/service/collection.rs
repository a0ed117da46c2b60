//! `DataCollectionService` wiring.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::error::ServiceError;
use super::status::{SourceStatus, StatusReport};
use crate::adapter::{build_adapters, AdapterList};
use crate::config::ConfigFile;
use crate::fusion::FusionEngine;
use crate::orchestrator::CollectionOrchestrator;
use crate::record::{AircraftRecord, Bounds, FusedRecord, VesselRecord};
use crate::sink::{RawDataSink, TracingRawSink};
use crate::telemetry::{CollectionMetrics, TelemetrySnapshot};

/// Collects and fuses positions for both entity classes.
pub struct DataCollectionService {
    bounds: Bounds,
    aircraft: CollectionOrchestrator<AircraftRecord>,
    vessel: CollectionOrchestrator<VesselRecord>,
    metrics: Arc<CollectionMetrics>,
}

impl DataCollectionService {
    /// Build from configuration with a sink that logs each batch.
    pub fn from_config(config: &ConfigFile) -> Result<Self, ServiceError> {
        Self::with_sink(config, Arc::new(TracingRawSink))
    }

    /// Build from configuration, sending raw batches of both classes to
    /// `sink`.
    pub fn with_sink<S>(config: &ConfigFile, sink: Arc<S>) -> Result<Self, ServiceError>
    where
        S: RawDataSink<AircraftRecord> + RawDataSink<VesselRecord> + 'static,
    {
        config.validate()?;
        let adapters = build_adapters(config)?;
        let fusion = FusionEngine::with_priorities(config.priorities());

        info!(
            aircraft_sources = adapters.aircraft.len(),
            vessel_sources = adapters.vessel.len(),
            "Data collection service configured"
        );

        let aircraft_sink: Arc<dyn RawDataSink<AircraftRecord>> = sink.clone();
        let vessel_sink: Arc<dyn RawDataSink<VesselRecord>> = sink;
        Ok(Self::new(
            config.bounds,
            adapters.aircraft,
            adapters.vessel,
            aircraft_sink,
            vessel_sink,
            fusion,
        ))
    }

    /// Assemble from already-built adapters.
    pub fn new(
        bounds: Bounds,
        aircraft: AdapterList<AircraftRecord>,
        vessel: AdapterList<VesselRecord>,
        aircraft_sink: Arc<dyn RawDataSink<AircraftRecord>>,
        vessel_sink: Arc<dyn RawDataSink<VesselRecord>>,
        fusion: FusionEngine,
    ) -> Self {
        let metrics = Arc::new(CollectionMetrics::new());
        Self {
            bounds,
            aircraft: CollectionOrchestrator::new(
                aircraft,
                aircraft_sink,
                fusion.clone(),
                Arc::clone(&metrics),
            ),
            vessel: CollectionOrchestrator::new(vessel, vessel_sink, fusion, Arc::clone(&metrics)),
            metrics,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn aircraft(&self) -> &CollectionOrchestrator<AircraftRecord> {
        &self.aircraft
    }

    pub fn vessel(&self) -> &CollectionOrchestrator<VesselRecord> {
        &self.vessel
    }

    /// One aircraft cycle across every enabled aircraft source.
    pub async fn collect_all_aircraft_data(&self) -> Vec<FusedRecord<AircraftRecord>> {
        self.aircraft.collect_and_fuse(&self.bounds).await
    }

    /// One vessel cycle across every enabled vessel source.
    pub async fn collect_all_vessel_data(&self) -> Vec<FusedRecord<VesselRecord>> {
        self.vessel.collect_and_fuse(&self.bounds).await
    }

    /// Per-source health plus per-class cycle summaries.
    pub fn get_all_sources_status(&self) -> StatusReport {
        let sources = self
            .aircraft
            .adapters()
            .iter()
            .map(|adapter| SourceStatus::from_adapter(adapter.as_ref()))
            .chain(
                self.vessel
                    .adapters()
                    .iter()
                    .map(|adapter| SourceStatus::from_adapter(adapter.as_ref())),
            )
            .collect();

        StatusReport {
            generated_at: Utc::now(),
            sources,
            aircraft: self.aircraft.class_status(),
            vessel: self.vessel.class_status(),
            telemetry: self.metrics.snapshot(),
        }
    }

    pub fn telemetry_snapshot(&self) -> TelemetrySnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::CircuitState;
    use crate::record::{EntityClass, SourceId};
    use crate::sink::MemoryRawSink;

    fn simulated_config() -> ConfigFile {
        let mut config = ConfigFile::default();
        config.bounds = Bounds::new(48.0, 58.0, -6.0, 10.0);
        config
    }

    #[tokio::test]
    async fn test_simulated_cycles_produce_fused_records() {
        let service = DataCollectionService::from_config(&simulated_config()).unwrap();

        let aircraft = service.collect_all_aircraft_data().await;
        assert!(!aircraft.is_empty());
        assert!(aircraft.iter().all(|f| service.bounds().contains(&f.record.position)));
        assert!(aircraft.iter().any(|f| f.group_size > 1));

        let vessels = service.collect_all_vessel_data().await;
        assert!(!vessels.is_empty());
        assert!(vessels.iter().all(|f| f.record.mmsi.len() == 9));
    }

    #[tokio::test]
    async fn test_status_report_covers_enabled_sources() {
        let mut config = simulated_config();
        config.source_mut(SourceId::VesselFinder).enabled = false;
        let service = DataCollectionService::from_config(&config).unwrap();
        service.collect_all_vessel_data().await;

        let report = service.get_all_sources_status();
        assert_eq!(report.sources.len(), 5);
        assert!(report.source(SourceId::VesselFinder).is_none());

        let aishub = report.source(SourceId::AisHub).unwrap();
        assert_eq!(aishub.class, EntityClass::Vessel);
        assert_eq!(aishub.health.circuit_state, CircuitState::Closed);
        assert_eq!(aishub.health.successes, 1);
        assert_eq!(aishub.endpoint, "simulated://aishub");

        assert_eq!(report.vessel.cycles, 1);
        assert_eq!(report.aircraft.cycles, 0);
        assert_eq!(report.telemetry.cycles, 1);
        assert!(report.open_circuits().is_empty());
    }

    #[tokio::test]
    async fn test_custom_sink_receives_both_classes() {
        let sink = Arc::new(BothSink::default());
        let service = DataCollectionService::with_sink(&simulated_config(), sink.clone()).unwrap();
        service.collect_all_aircraft_data().await;
        service.collect_all_vessel_data().await;

        for _ in 0..20 {
            if sink.aircraft.len() == 2 && sink.vessel.len() == 4 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(sink.aircraft.len(), 2);
        assert_eq!(sink.vessel.len(), 4);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ConfigFile::default();
        config.bounds = Bounds::new(10.0, 5.0, 0.0, 1.0);
        assert!(matches!(
            DataCollectionService::from_config(&config),
            Err(ServiceError::Config(_))
        ));
    }

    struct BothSink {
        aircraft: Arc<MemoryRawSink<AircraftRecord>>,
        vessel: Arc<MemoryRawSink<VesselRecord>>,
    }

    impl Default for BothSink {
        fn default() -> Self {
            Self {
                aircraft: MemoryRawSink::new(),
                vessel: MemoryRawSink::new(),
            }
        }
    }

    impl RawDataSink<AircraftRecord> for BothSink {
        fn store(
            &self,
            batch: crate::sink::RawBatch<AircraftRecord>,
        ) -> crate::adapter::BoxFuture<'_, Result<(), crate::sink::SinkError>> {
            self.aircraft.store(batch)
        }
    }

    impl RawDataSink<VesselRecord> for BothSink {
        fn store(
            &self,
            batch: crate::sink::RawBatch<VesselRecord>,
        ) -> crate::adapter::BoxFuture<'_, Result<(), crate::sink::SinkError>> {
            self.vessel.store(batch)
        }
    }
}
