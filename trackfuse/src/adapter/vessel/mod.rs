//! Vessel (AIS) feeds: MarineTraffic, VesselFinder, AISHub and
//! MyShipTracking.

mod aishub;
mod marinetraffic;
mod myshiptracking;
mod vesselfinder;

pub use aishub::AisHubFeed;
pub use marinetraffic::MarineTrafficFeed;
pub use myshiptracking::MyShipTrackingFeed;
pub use vesselfinder::VesselFinderFeed;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::fields::{normalize_degrees, FieldAlias};
use crate::record::{Position, SourceId, VesselRecord};

/// AIS "speed not available".
const SPEED_UNAVAILABLE: f64 = 102.3;
/// AIS "course not available".
const COURSE_UNAVAILABLE: f64 = 360.0;
/// Headings at or above this are "not available" (AIS sends 511).
const HEADING_LIMIT: f64 = 360.0;

/// Alias table for one vessel provider.
pub(crate) struct VesselFields {
    pub mmsi: FieldAlias,
    pub imo: FieldAlias,
    pub name: FieldAlias,
    pub callsign: FieldAlias,
    pub latitude: FieldAlias,
    pub longitude: FieldAlias,
    pub speed: FieldAlias,
    pub course: FieldAlias,
    pub heading: FieldAlias,
    pub nav_status: FieldAlias,
    pub destination: FieldAlias,
    pub timestamp: FieldAlias,
    /// Multiplier turning the provider's speed into knots.
    pub speed_scale: f64,
}

impl VesselFields {
    /// Map one item. `None` without an MMSI or a position.
    ///
    /// The MMSI is kept as reported; format validation happens at fusion.
    pub fn map(
        &self,
        item: &Value,
        source: SourceId,
        quality: f64,
        reference_time: DateTime<Utc>,
    ) -> Option<VesselRecord> {
        let mmsi = self.mmsi.text(item)?;
        let position = Position::new(self.latitude.number(item)?, self.longitude.number(item)?);
        let timestamp = self.timestamp.timestamp(item).unwrap_or(reference_time);

        let mut record = VesselRecord::new(mmsi, position, timestamp, source, quality);
        record.imo = self.imo.text(item).filter(|imo| imo != "0");
        record.name = self.name.text(item);
        record.callsign = self.callsign.text(item);
        record.speed_kts = self
            .speed
            .number(item)
            .map(|raw| raw * self.speed_scale)
            .filter(|knots| *knots >= 0.0 && (knots - SPEED_UNAVAILABLE).abs() > 1e-6);
        record.course_deg = self
            .course
            .number(item)
            .filter(|course| *course >= 0.0 && *course < COURSE_UNAVAILABLE)
            .map(normalize_degrees);
        record.heading_deg = self
            .heading
            .number(item)
            .filter(|heading| *heading >= 0.0 && *heading < HEADING_LIMIT);
        record.nav_status = self.nav_status.text(item).and_then(|status| nav_status(&status));
        record.destination = self.destination.text(item);
        record.raw = item.clone();
        Some(record)
    }
}

/// Render an AIS navigational status, accepting either the numeric code or
/// a provider's own text. Code 15 ("not defined") maps to `None`.
pub(crate) fn nav_status(value: &str) -> Option<String> {
    let Ok(code) = value.parse::<u8>() else {
        return Some(value.to_string());
    };
    let text = match code {
        0 => "Under way using engine",
        1 => "At anchor",
        2 => "Not under command",
        3 => "Restricted manoeuvrability",
        4 => "Constrained by her draught",
        5 => "Moored",
        6 => "Aground",
        7 => "Engaged in fishing",
        8 => "Under way sailing",
        14 => "AIS-SART active",
        9..=13 => "Reserved",
        _ => return None,
    };
    Some(text.to_string())
}

/// Numeric AIS code for a status string produced by [`nav_status`].
pub(crate) fn nav_status_code(text: &str) -> u8 {
    match text {
        "Under way using engine" => 0,
        "At anchor" => 1,
        "Not under command" => 2,
        "Restricted manoeuvrability" => 3,
        "Constrained by her draught" => 4,
        "Moored" => 5,
        "Aground" => 6,
        "Engaged in fishing" => 7,
        "Under way sailing" => 8,
        "AIS-SART active" => 14,
        _ => 15,
    }
}
