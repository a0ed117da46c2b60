//! ADS-B Exchange (v2 API via RapidAPI).
//!
//! Response shape:
//!
//! ```json
//! {"now": 1700000000000, "ac": [{"hex": "4ca7b5", "flight": "RYR12  ", "lat": 53.1,
//!   "lon": -6.2, "alt_baro": 35000, "gs": 451.2, "track": 92.1, "baro_rate": -64,
//!   "squawk": "2301", "seen_pos": 0.4}]}
//! ```
//!
//! `alt_baro` is the string `"ground"` for aircraft on the surface. Item
//! timestamps are relative: `seen_pos` seconds before `now`.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::AircraftFields;
use crate::adapter::feed::{Feed, MapContext, Payload};
use crate::adapter::fields::{timestamp_from_epoch, FieldAlias, FieldKey};
use crate::adapter::simulation::SyntheticTrack;
use crate::adapter::types::{AdapterError, QualityBand};
use crate::config::SourceConfig;
use crate::provider::HttpRequest;
use crate::record::{AircraftRecord, Bounds, SourceId};

const QUALITY: QualityBand = QualityBand::fixed(0.95);

/// Largest query radius the API accepts, in nautical miles.
const MAX_RADIUS_NM: f64 = 250.0;

const RAPIDAPI_HOST: &str = "adsbexchange-com1.p.rapidapi.com";

const FIELDS: AircraftFields = AircraftFields {
    hex: FieldAlias::new("hex", &[FieldKey::Name("hex"), FieldKey::Name("icao")]),
    callsign: FieldAlias::new("callsign", &[FieldKey::Name("flight"), FieldKey::Name("call")]),
    latitude: FieldAlias::new("latitude", &[FieldKey::Name("lat"), FieldKey::Name("rr_lat")]),
    longitude: FieldAlias::new("longitude", &[FieldKey::Name("lon"), FieldKey::Name("rr_lon")]),
    altitude: FieldAlias::new(
        "altitude",
        &[FieldKey::Name("alt_baro"), FieldKey::Name("alt_geom")],
    ),
    ground_speed: FieldAlias::new("ground_speed", &[FieldKey::Name("gs"), FieldKey::Name("spd")]),
    track: FieldAlias::new("track", &[FieldKey::Name("track"), FieldKey::Name("trak")]),
    heading: FieldAlias::new(
        "heading",
        &[FieldKey::Name("true_heading"), FieldKey::Name("mag_heading")],
    ),
    vertical_rate: FieldAlias::new(
        "vertical_rate",
        &[FieldKey::Name("baro_rate"), FieldKey::Name("geom_rate")],
    ),
    squawk: FieldAlias::new("squawk", &[FieldKey::Name("squawk"), FieldKey::Name("sqk")]),
    on_ground: FieldAlias::new("on_ground", &[FieldKey::Name("gnd")]),
    altitude_scale: 1.0,
    speed_scale: 1.0,
    vertical_rate_scale: 1.0,
};

const AGE: FieldAlias =
    FieldAlias::new("age", &[FieldKey::Name("seen_pos"), FieldKey::Name("seen")]);

/// ADS-B Exchange feed. Quality 0.95.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdsbExchangeFeed;

impl Feed for AdsbExchangeFeed {
    type Record = AircraftRecord;

    fn source(&self) -> SourceId {
        SourceId::AdsbExchange
    }

    fn quality(&self) -> QualityBand {
        QUALITY
    }

    fn request(&self, config: &SourceConfig, bounds: &Bounds) -> HttpRequest {
        let center = bounds.center();
        let url = format!(
            "{}/lat/{:.4}/lon/{:.4}/dist/{}/",
            config.base_url.trim_end_matches('/'),
            center.latitude,
            center.longitude,
            query_radius_nm(bounds)
        );
        let request =
            HttpRequest::get(url, config.timeout).with_header("x-rapidapi-host", RAPIDAPI_HOST);
        match &config.api_key {
            Some(key) => request.with_header("x-rapidapi-key", key.as_str()),
            None => request,
        }
    }

    fn split(&self, mut body: Value) -> Result<Payload, AdapterError> {
        let reported_at = body
            .get("now")
            .and_then(Value::as_f64)
            .and_then(timestamp_from_epoch);
        let items = match body.get_mut("ac").map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            Some(_) => return Err(AdapterError::Malformed("'ac' is not an array".into())),
            None => {
                let message = body
                    .get("message")
                    .or_else(|| body.get("msg"))
                    .and_then(Value::as_str)
                    .unwrap_or("missing 'ac'");
                return Err(AdapterError::Malformed(message.to_string()));
            }
        };
        Ok(Payload { items, reported_at })
    }

    fn map(&self, item: &Value, context: &MapContext) -> Option<AircraftRecord> {
        let age_ms = AGE
            .number(item)
            .filter(|age| *age >= 0.0)
            .map(|age| (age * 1000.0).round() as i64)
            .unwrap_or(0);
        let timestamp = context.reference_time - chrono::Duration::milliseconds(age_ms);

        let mut record = FIELDS.map(item, self.source(), context.quality, timestamp)?;
        let on_surface = item
            .get("alt_baro")
            .and_then(Value::as_str)
            .is_some_and(|alt| alt.eq_ignore_ascii_case("ground"));
        if on_surface {
            record.on_ground = Some(true);
        } else if record.on_ground.is_none() && record.altitude_ft.is_some() {
            record.on_ground = Some(false);
        }
        Some(record)
    }

    fn render(&self, tracks: &[SyntheticTrack], at: DateTime<Utc>) -> Value {
        let aircraft: Vec<Value> = tracks
            .iter()
            .map(|track| {
                let altitude = if track.on_ground {
                    json!("ground")
                } else {
                    json!(track.altitude_ft)
                };
                json!({
                    "hex": track.identity.to_ascii_lowercase(),
                    "flight": track.callsign.as_ref().map(|c| format!("{:<8}", c)),
                    "lat": track.position.latitude,
                    "lon": track.position.longitude,
                    "alt_baro": altitude,
                    "gs": track.speed_kts,
                    "track": track.course_deg,
                    "baro_rate": track.vertical_rate_fpm,
                    "squawk": track.squawk,
                    "seen_pos": 0.5,
                })
            })
            .collect();
        json!({
            "now": at.timestamp_millis(),
            "total": aircraft.len(),
            "ac": aircraft,
        })
    }
}

/// Radius from the box centre to its corner, capped at the API limit.
fn query_radius_nm(bounds: &Bounds) -> u32 {
    let center = bounds.center();
    let half_lat_nm = bounds.lat_span() * 60.0 / 2.0;
    let half_lon_nm = bounds.lon_span() * 60.0 * center.latitude.to_radians().cos() / 2.0;
    let radius = half_lat_nm.hypot(half_lon_nm).ceil();
    radius.clamp(1.0, MAX_RADIUS_NM) as u32
}
