//! Builds the configured adapters for each entity class.

use std::sync::Arc;

use tracing::info;

use super::aircraft::{AdsbExchangeFeed, OpenSkyFeed};
use super::feed::{Feed, FeedAdapter};
use super::simulation::SyntheticFleet;
use super::types::SourceAdapter;
use super::vessel::{AisHubFeed, MarineTrafficFeed, MyShipTrackingFeed, VesselFinderFeed};
use crate::config::{ConfigFile, SourceConfig};
use crate::provider::{AsyncReqwestClient, ProviderError};
use crate::record::{AircraftRecord, EntityClass, SourceId, VesselRecord};

/// Adapter handles for one entity class.
pub type AdapterList<R> = Vec<Arc<dyn SourceAdapter<R>>>;

/// Every enabled adapter, split by entity class.
pub struct AdapterSet {
    pub aircraft: AdapterList<AircraftRecord>,
    pub vessel: AdapterList<VesselRecord>,
}

/// Build all enabled adapters described by `config`.
///
/// Live adapters share one HTTP client. Simulated adapters of a class share
/// one synthetic fleet.
pub fn build_adapters(config: &ConfigFile) -> Result<AdapterSet, ProviderError> {
    let client = AsyncReqwestClient::new()?;
    let aircraft_fleet = Arc::new(SyntheticFleet::new(
        EntityClass::Aircraft,
        config.simulation.aircraft_fleet_size,
        config.simulation.seed,
        config.bounds,
    ));
    let vessel_fleet = Arc::new(SyntheticFleet::new(
        EntityClass::Vessel,
        config.simulation.vessel_fleet_size,
        config.simulation.seed.wrapping_add(1),
        config.bounds,
    ));

    let mut set = AdapterSet {
        aircraft: Vec::new(),
        vessel: Vec::new(),
    };

    for source in config.enabled_sources() {
        let fleet = match source.source.class() {
            EntityClass::Aircraft => &aircraft_fleet,
            EntityClass::Vessel => &vessel_fleet,
        };
        match source.source {
            SourceId::AdsbExchange => set
                .aircraft
                .push(build(AdsbExchangeFeed, source, &client, fleet)),
            SourceId::OpenSky => set.aircraft.push(build(OpenSkyFeed, source, &client, fleet)),
            SourceId::MarineTraffic => set
                .vessel
                .push(build(MarineTrafficFeed, source, &client, fleet)),
            SourceId::VesselFinder => set
                .vessel
                .push(build(VesselFinderFeed, source, &client, fleet)),
            SourceId::AisHub => set.vessel.push(build(AisHubFeed, source, &client, fleet)),
            SourceId::MyShipTracking => set
                .vessel
                .push(build(MyShipTrackingFeed, source, &client, fleet)),
        }
        info!(
            source = %source.source,
            mode = if source.simulated { "simulated" } else { "live" },
            "Registered source adapter"
        );
    }

    Ok(set)
}

fn build<F: Feed>(
    feed: F,
    config: &SourceConfig,
    client: &AsyncReqwestClient,
    fleet: &Arc<SyntheticFleet>,
) -> Arc<dyn SourceAdapter<F::Record>> {
    if config.simulated {
        Arc::new(FeedAdapter::<F, AsyncReqwestClient>::simulated(
            feed,
            Arc::clone(fleet),
            config.clone(),
        ))
    } else {
        Arc::new(FeedAdapter::live(feed, client.clone(), config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterMode;

    #[test]
    fn test_builds_enabled_sources_per_class() {
        let mut config = ConfigFile::default();
        config.source_mut(SourceId::AisHub).enabled = false;
        config.source_mut(SourceId::OpenSky).simulated = false;

        let set = build_adapters(&config).unwrap();

        let aircraft: Vec<_> = set.aircraft.iter().map(|a| a.source()).collect();
        assert_eq!(aircraft, vec![SourceId::AdsbExchange, SourceId::OpenSky]);
        let vessel: Vec<_> = set.vessel.iter().map(|a| a.source()).collect();
        assert_eq!(
            vessel,
            vec![
                SourceId::MarineTraffic,
                SourceId::VesselFinder,
                SourceId::MyShipTracking
            ]
        );
        assert_eq!(set.aircraft[0].mode(), AdapterMode::Simulated);
        assert_eq!(set.aircraft[1].mode(), AdapterMode::Live);
    }
}
