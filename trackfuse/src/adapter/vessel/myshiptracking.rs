//! MyShipTracking zone query.
//!
//! `{"status": "success", "data": [...]}` with loosely named keys; the same
//! semantic field arrives under several spellings depending on API version
//! and plan, so every field has a multi-entry alias list. Field coverage is
//! partial, which is reflected in the 0.60 to 0.70 quality band.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::VesselFields;
use crate::adapter::feed::{Feed, MapContext, Payload};
use crate::adapter::fields::{FieldAlias, FieldKey};
use crate::adapter::simulation::SyntheticTrack;
use crate::adapter::types::{AdapterError, QualityBand};
use crate::config::SourceConfig;
use crate::provider::HttpRequest;
use crate::record::{Bounds, SourceId, VesselRecord};

const QUALITY: QualityBand = QualityBand::new(0.60, 0.70);

/// How far back the zone query looks for positions.
const MINUTES_BACK: u32 = 60;

const FIELDS: VesselFields = VesselFields {
    mmsi: FieldAlias::new("mmsi", &[FieldKey::Name("mmsi"), FieldKey::Name("MMSI")]),
    imo: FieldAlias::new("imo", &[FieldKey::Name("imo"), FieldKey::Name("IMO")]),
    name: FieldAlias::new(
        "name",
        &[
            FieldKey::Name("vessel_name"),
            FieldKey::Name("name"),
            FieldKey::Name("shipname"),
        ],
    ),
    callsign: FieldAlias::new(
        "callsign",
        &[FieldKey::Name("callsign"), FieldKey::Name("call_sign")],
    ),
    latitude: FieldAlias::new(
        "latitude",
        &[FieldKey::Name("lat"), FieldKey::Name("latitude"), FieldKey::Name("LAT")],
    ),
    longitude: FieldAlias::new(
        "longitude",
        &[
            FieldKey::Name("lng"),
            FieldKey::Name("lon"),
            FieldKey::Name("longitude"),
            FieldKey::Name("LON"),
        ],
    ),
    speed: FieldAlias::new("speed", &[FieldKey::Name("speed"), FieldKey::Name("sog")]),
    course: FieldAlias::new("course", &[FieldKey::Name("course"), FieldKey::Name("cog")]),
    heading: FieldAlias::new("heading", &[FieldKey::Name("heading"), FieldKey::Name("hdg")]),
    nav_status: FieldAlias::new(
        "nav_status",
        &[FieldKey::Name("nav_status"), FieldKey::Name("status")],
    ),
    destination: FieldAlias::new(
        "destination",
        &[FieldKey::Name("destination"), FieldKey::Name("dest")],
    ),
    timestamp: FieldAlias::new(
        "timestamp",
        &[
            FieldKey::Name("received"),
            FieldKey::Name("timestamp"),
            FieldKey::Name("last_position_UTC"),
        ],
    ),
    speed_scale: 1.0,
};

/// MyShipTracking feed. Quality band 0.60 to 0.70.
#[derive(Debug, Clone, Copy, Default)]
pub struct MyShipTrackingFeed;

impl Feed for MyShipTrackingFeed {
    type Record = VesselRecord;

    fn source(&self) -> SourceId {
        SourceId::MyShipTracking
    }

    fn quality(&self) -> QualityBand {
        QUALITY
    }

    fn request(&self, config: &SourceConfig, bounds: &Bounds) -> HttpRequest {
        let url = format!(
            "{}/vessel/zone?minlat={:.4}&maxlat={:.4}&minlon={:.4}&maxlon={:.4}&minutesBack={}",
            config.base_url.trim_end_matches('/'),
            bounds.min_lat,
            bounds.max_lat,
            bounds.min_lon,
            bounds.max_lon,
            MINUTES_BACK
        );
        let request = HttpRequest::get(url, config.timeout);
        match &config.api_key {
            Some(key) => request.with_header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    fn endpoint(&self, config: &SourceConfig) -> String {
        format!("{}/vessel/zone", config.base_url.trim_end_matches('/'))
    }

    fn split(&self, mut body: Value) -> Result<Payload, AdapterError> {
        let status = body.get("status").and_then(Value::as_str).unwrap_or("success");
        if status.eq_ignore_ascii_case("error") {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("provider reported an error");
            return Err(AdapterError::Malformed(message.to_string()));
        }
        let items = match body.get_mut("data").map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            _ => return Err(AdapterError::Malformed("missing 'data' array".into())),
        };
        Ok(Payload {
            items,
            reported_at: None,
        })
    }

    fn map(&self, item: &Value, context: &MapContext) -> Option<VesselRecord> {
        FIELDS.map(item, self.source(), context.quality, context.reference_time)
    }

    fn render(&self, tracks: &[SyntheticTrack], at: DateTime<Utc>) -> Value {
        let received = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let data: Vec<Value> = tracks
            .iter()
            .map(|track| {
                // Partial coverage: no IMO, heading or destination.
                json!({
                    "mmsi": track.identity,
                    "vessel_name": track.name,
                    "lat": track.position.latitude,
                    "lng": track.position.longitude,
                    "speed": (track.speed_kts * 10.0).round() / 10.0,
                    "course": track.course_deg.round(),
                    "nav_status": track.nav_status,
                    "received": received,
                })
            })
            .collect();
        json!({"status": "success", "duration": "0.01", "data": data})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Position;
    use chrono::TimeZone;

    fn context() -> MapContext {
        MapContext::new(Utc.timestamp_opt(1_700_000_100, 0).unwrap(), QUALITY.nominal())
    }

    #[test]
    fn test_nominal_quality_is_band_midpoint() {
        let item = json!({"mmsi": "244660000", "lat": 52.0, "lng": 4.0});
        let record = MyShipTrackingFeed.map(&item, &context()).unwrap();
        assert!((record.data_quality - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_alias_priority() {
        let item = json!({
            "MMSI": "211000000", "mmsi": "244660000",
            "latitude": 10.0, "lat": null, "LAT": 11.0,
            "lon": 4.5, "longitude": 99.0,
            "name": "SECOND", "vessel_name": "",
            "sog": 9.0, "cog": 180.0, "status": "Moored",
            "timestamp": "2023-11-14T22:13:20Z"
        });
        let record = MyShipTrackingFeed.map(&item, &context()).unwrap();

        assert_eq!(record.mmsi, "244660000");
        assert_eq!(record.position, Position::new(10.0, 4.5));
        assert_eq!(record.name.as_deref(), Some("SECOND"));
        assert_eq!(record.speed_kts, Some(9.0));
        assert_eq!(record.course_deg, Some(180.0));
        assert_eq!(record.nav_status.as_deref(), Some("Moored"));
        assert_eq!(record.timestamp, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    }

    #[test]
    fn test_missing_mmsi_is_dropped() {
        let item = json!({"vessel_name": "GHOST", "lat": 52.0, "lng": 4.0});
        assert!(MyShipTrackingFeed.map(&item, &context()).is_none());
    }

    #[test]
    fn test_split() {
        let payload = MyShipTrackingFeed
            .split(json!({"status": "success", "data": [{"mmsi": "1"}]}))
            .unwrap();
        assert_eq!(payload.items.len(), 1);

        let err = MyShipTrackingFeed
            .split(json!({"status": "error", "message": "Invalid api key"}))
            .unwrap_err();
        assert_eq!(err, AdapterError::Malformed("Invalid api key".into()));
        assert!(MyShipTrackingFeed.split(json!({"status": "success"})).is_err());
    }

    #[test]
    fn test_request_uses_bearer_token() {
        let mut config = SourceConfig::defaults(SourceId::MyShipTracking);
        config.base_url = "https://mst.test/api/v2".into();
        config.api_key = Some("tok".into());
        let request = MyShipTrackingFeed.request(&config, &Bounds::new(50.0, 55.0, 0.0, 8.0));

        assert_eq!(
            request.url,
            "https://mst.test/api/v2/vessel/zone?minlat=50.0000&maxlat=55.0000&minlon=0.0000&maxlon=8.0000&minutesBack=60"
        );
        assert_eq!(
            request.headers,
            vec![("Authorization".to_string(), "Bearer tok".to_string())]
        );
    }

    #[test]
    fn test_render_round_trips_through_map() {
        let track = SyntheticTrack {
            identity: "244660000".into(),
            callsign: Some("PBXY".into()),
            name: Some("NORDIC STAR".into()),
            imo: Some("9434761".into()),
            position: Position::new(52.0, 4.0),
            speed_kts: 12.34,
            course_deg: 270.4,
            altitude_ft: None,
            vertical_rate_fpm: None,
            squawk: None,
            on_ground: false,
            nav_status: Some("Moored".into()),
            destination: Some("ROTTERDAM".into()),
        };
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let payload = MyShipTrackingFeed
            .split(MyShipTrackingFeed.render(&[track], at))
            .unwrap();
        let record = MyShipTrackingFeed
            .map(&payload.items[0], &MapContext::new(at, 0.65))
            .unwrap();

        assert_eq!(record.mmsi, "244660000");
        assert_eq!(record.imo, None);
        assert_eq!(record.destination, None);
        assert_eq!(record.speed_kts, Some(12.3));
        assert_eq!(record.timestamp, at);
    }
}
