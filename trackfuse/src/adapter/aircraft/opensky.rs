//! OpenSky Network `/states/all`.
//!
//! Each state vector is a positional array:
//!
//! | idx | field           | unit |
//! |-----|-----------------|------|
//! | 0   | icao24          |      |
//! | 1   | callsign        |      |
//! | 3   | time_position   | s    |
//! | 4   | last_contact    | s    |
//! | 5   | longitude       | deg  |
//! | 6   | latitude        | deg  |
//! | 7   | baro_altitude   | m    |
//! | 8   | on_ground       |      |
//! | 9   | velocity        | m/s  |
//! | 10  | true_track      | deg  |
//! | 11  | vertical_rate   | m/s  |
//! | 13  | geo_altitude    | m    |
//! | 14  | squawk          |      |
//!
//! Units are SI and converted to feet, knots and feet per minute here.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::{AircraftFields, METERS_TO_FEET, MPS_TO_FPM, MPS_TO_KNOTS};
use crate::adapter::feed::{Feed, MapContext, Payload};
use crate::adapter::fields::{timestamp_from_epoch, FieldAlias, FieldKey};
use crate::adapter::simulation::SyntheticTrack;
use crate::adapter::types::{AdapterError, QualityBand};
use crate::config::SourceConfig;
use crate::provider::HttpRequest;
use crate::record::{AircraftRecord, Bounds, SourceId};

const QUALITY: QualityBand = QualityBand::fixed(0.80);

const FIELDS: AircraftFields = AircraftFields {
    hex: FieldAlias::new("hex", &[FieldKey::Index(0)]),
    callsign: FieldAlias::new("callsign", &[FieldKey::Index(1)]),
    latitude: FieldAlias::new("latitude", &[FieldKey::Index(6)]),
    longitude: FieldAlias::new("longitude", &[FieldKey::Index(5)]),
    altitude: FieldAlias::new("altitude", &[FieldKey::Index(7), FieldKey::Index(13)]),
    ground_speed: FieldAlias::new("ground_speed", &[FieldKey::Index(9)]),
    track: FieldAlias::new("track", &[FieldKey::Index(10)]),
    heading: FieldAlias::new("heading", &[]),
    vertical_rate: FieldAlias::new("vertical_rate", &[FieldKey::Index(11)]),
    squawk: FieldAlias::new("squawk", &[FieldKey::Index(14)]),
    on_ground: FieldAlias::new("on_ground", &[FieldKey::Index(8)]),
    altitude_scale: METERS_TO_FEET,
    speed_scale: MPS_TO_KNOTS,
    vertical_rate_scale: MPS_TO_FPM,
};

const TIMESTAMP: FieldAlias =
    FieldAlias::new("timestamp", &[FieldKey::Index(3), FieldKey::Index(4)]);

/// OpenSky Network feed. Quality 0.80.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSkyFeed;

impl Feed for OpenSkyFeed {
    type Record = AircraftRecord;

    fn source(&self) -> SourceId {
        SourceId::OpenSky
    }

    fn quality(&self) -> QualityBand {
        QUALITY
    }

    fn request(&self, config: &SourceConfig, bounds: &Bounds) -> HttpRequest {
        let url = format!(
            "{}/states/all?lamin={:.4}&lomin={:.4}&lamax={:.4}&lomax={:.4}",
            config.base_url.trim_end_matches('/'),
            bounds.min_lat,
            bounds.min_lon,
            bounds.max_lat,
            bounds.max_lon
        );
        let request = HttpRequest::get(url, config.timeout);
        match &config.api_key {
            Some(token) => request.with_header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    fn endpoint(&self, config: &SourceConfig) -> String {
        format!("{}/states/all", config.base_url.trim_end_matches('/'))
    }

    fn split(&self, mut body: Value) -> Result<Payload, AdapterError> {
        let reported_at = body
            .get("time")
            .and_then(Value::as_f64)
            .and_then(timestamp_from_epoch);
        let items = match body.get_mut("states").map(Value::take) {
            Some(Value::Array(states)) => states,
            Some(Value::Null) => Vec::new(),
            Some(_) => return Err(AdapterError::Malformed("'states' is not an array".into())),
            None => return Err(AdapterError::Malformed("missing 'states'".into())),
        };
        Ok(Payload { items, reported_at })
    }

    fn map(&self, item: &Value, context: &MapContext) -> Option<AircraftRecord> {
        if !item.is_array() {
            return None;
        }
        let timestamp = TIMESTAMP.timestamp(item).unwrap_or(context.reference_time);
        FIELDS.map(item, self.source(), context.quality, timestamp)
    }

    fn render(&self, tracks: &[SyntheticTrack], at: DateTime<Utc>) -> Value {
        let now = at.timestamp();
        let states: Vec<Value> = tracks
            .iter()
            .map(|track| {
                let altitude_m = track.altitude_ft.map(|ft| ft / METERS_TO_FEET);
                json!([
                    track.identity.to_ascii_lowercase(),
                    track.callsign.as_ref().map(|c| format!("{:<8}", c)),
                    "Unknown",
                    now,
                    now,
                    track.position.longitude,
                    track.position.latitude,
                    altitude_m,
                    track.on_ground,
                    track.speed_kts / MPS_TO_KNOTS,
                    track.course_deg,
                    track.vertical_rate_fpm.map(|fpm| fpm / MPS_TO_FPM),
                    null,
                    altitude_m,
                    track.squawk,
                    false,
                    0
                ])
            })
            .collect();
        json!({ "time": now, "states": states })
    }
}
