//! Aircraft feeds: ADS-B Exchange and OpenSky Network.

mod adsbexchange;
mod opensky;

pub use adsbexchange::AdsbExchangeFeed;
pub use opensky::OpenSkyFeed;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::fields::{normalize_degrees, FieldAlias};
use crate::record::{normalize_hex, AircraftRecord, Position, SourceId};

pub(crate) const METERS_TO_FEET: f64 = 3.280_839_895;
pub(crate) const MPS_TO_KNOTS: f64 = 1.943_844_492;
pub(crate) const MPS_TO_FPM: f64 = 196.850_393_7;

/// Alias table for one aircraft provider, plus the unit scale that turns
/// its values into canonical units.
pub(crate) struct AircraftFields {
    pub hex: FieldAlias,
    pub callsign: FieldAlias,
    pub latitude: FieldAlias,
    pub longitude: FieldAlias,
    pub altitude: FieldAlias,
    pub ground_speed: FieldAlias,
    pub track: FieldAlias,
    pub heading: FieldAlias,
    pub vertical_rate: FieldAlias,
    pub squawk: FieldAlias,
    pub on_ground: FieldAlias,
    pub altitude_scale: f64,
    pub speed_scale: f64,
    pub vertical_rate_scale: f64,
}

impl AircraftFields {
    /// Map one item. `None` without a valid hex or a position.
    pub fn map(
        &self,
        item: &Value,
        source: SourceId,
        quality: f64,
        timestamp: DateTime<Utc>,
    ) -> Option<AircraftRecord> {
        let hex = normalize_hex(&self.hex.text(item)?)?;
        let position = Position::new(self.latitude.number(item)?, self.longitude.number(item)?);

        let mut record = AircraftRecord::new(hex, position, timestamp, source, quality);
        record.callsign = self.callsign.text(item);
        record.altitude_ft = self.altitude.number(item).map(|v| v * self.altitude_scale);
        record.ground_speed_kts = self
            .ground_speed
            .number(item)
            .filter(|v| *v >= 0.0)
            .map(|v| v * self.speed_scale);
        record.track_deg = self.track.number(item).map(normalize_degrees);
        record.heading_deg = self.heading.number(item).map(normalize_degrees);
        record.vertical_rate_fpm = self
            .vertical_rate
            .number(item)
            .map(|v| v * self.vertical_rate_scale);
        record.squawk = self.squawk.text(item);
        record.on_ground = self.on_ground.boolean(item);
        record.raw = item.clone();
        Some(record)
    }
}
