//! Source provenance tags and entity classes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Class of tracked entity a source reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityClass {
    Aircraft,
    Vessel,
}

impl EntityClass {
    /// All classes, in reporting order.
    pub const ALL: [EntityClass; 2] = [EntityClass::Aircraft, EntityClass::Vessel];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityClass::Aircraft => "aircraft",
            EntityClass::Vessel => "vessel",
        }
    }

    /// Sources registered for this class.
    pub fn sources(&self) -> &'static [SourceId] {
        match self {
            EntityClass::Aircraft => &[SourceId::AdsbExchange, SourceId::OpenSky],
            EntityClass::Vessel => &[
                SourceId::MarineTraffic,
                SourceId::VesselFinder,
                SourceId::AisHub,
                SourceId::MyShipTracking,
            ],
        }
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance tag naming one of the external data providers.
///
/// Declaration order is the last-resort tie-break in fusion ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    AdsbExchange,
    OpenSky,
    MarineTraffic,
    VesselFinder,
    AisHub,
    MyShipTracking,
}

impl SourceId {
    /// Every known source.
    pub const ALL: [SourceId; 6] = [
        SourceId::AdsbExchange,
        SourceId::OpenSky,
        SourceId::MarineTraffic,
        SourceId::VesselFinder,
        SourceId::AisHub,
        SourceId::MyShipTracking,
    ];

    /// Stable lowercase name used in config sections, logs and the raw sink.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::AdsbExchange => "adsbexchange",
            SourceId::OpenSky => "opensky",
            SourceId::MarineTraffic => "marinetraffic",
            SourceId::VesselFinder => "vesselfinder",
            SourceId::AisHub => "aishub",
            SourceId::MyShipTracking => "myshiptracking",
        }
    }

    pub fn class(&self) -> EntityClass {
        match self {
            SourceId::AdsbExchange | SourceId::OpenSky => EntityClass::Aircraft,
            SourceId::MarineTraffic
            | SourceId::VesselFinder
            | SourceId::AisHub
            | SourceId::MyShipTracking => EntityClass::Vessel,
        }
    }

    /// Default tie-break priority. Lower wins.
    pub fn default_priority(&self) -> u32 {
        match self {
            SourceId::AdsbExchange => 1,
            SourceId::OpenSky => 2,
            SourceId::MarineTraffic => 1,
            SourceId::VesselFinder => 2,
            SourceId::AisHub => 3,
            SourceId::MyShipTracking => 4,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown source name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source '{0}'")]
pub struct UnknownSource(pub String);

impl FromStr for SourceId {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str() == needle)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_name_round_trip() {
        for id in SourceId::ALL {
            assert_eq!(id.as_str().parse::<SourceId>(), Ok(id));
        }
        assert_eq!("  OpenSky ".parse::<SourceId>(), Ok(SourceId::OpenSky));
        assert!("flightradar".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_class_registry_matches_source_class() {
        for class in EntityClass::ALL {
            for source in class.sources() {
                assert_eq!(source.class(), class);
            }
        }
        assert_eq!(EntityClass::Aircraft.sources().len(), 2);
        assert_eq!(EntityClass::Vessel.sources().len(), 4);
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&SourceId::MarineTraffic).unwrap();
        assert_eq!(json, "\"marinetraffic\"");
        let class = serde_json::to_string(&EntityClass::Vessel).unwrap();
        assert_eq!(class, "\"vessel\"");
    }
}
