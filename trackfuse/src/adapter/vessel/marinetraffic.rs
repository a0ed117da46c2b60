//! MarineTraffic `exportvessels` (protocol `jsono`).
//!
//! The body is an array of objects with UPPERCASE keys. `SPEED` is in
//! tenths of a knot; `STATUS` is the numeric AIS navigational status.
//! Errors come back as `{"errors": [{"code": "...", "detail": "..."}]}`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::{nav_status_code, VesselFields};
use crate::adapter::feed::{Feed, MapContext, Payload};
use crate::adapter::fields::{FieldAlias, FieldKey};
use crate::adapter::simulation::SyntheticTrack;
use crate::adapter::types::{AdapterError, QualityBand};
use crate::config::SourceConfig;
use crate::provider::HttpRequest;
use crate::record::{Bounds, SourceId, VesselRecord};

const QUALITY: QualityBand = QualityBand::fixed(0.90);

const FIELDS: VesselFields = VesselFields {
    mmsi: FieldAlias::new("mmsi", &[FieldKey::Name("MMSI")]),
    imo: FieldAlias::new("imo", &[FieldKey::Name("IMO")]),
    name: FieldAlias::new("name", &[FieldKey::Name("SHIPNAME"), FieldKey::Name("SHIP_NAME")]),
    callsign: FieldAlias::new("callsign", &[FieldKey::Name("CALLSIGN")]),
    latitude: FieldAlias::new("latitude", &[FieldKey::Name("LAT")]),
    longitude: FieldAlias::new("longitude", &[FieldKey::Name("LON")]),
    speed: FieldAlias::new("speed", &[FieldKey::Name("SPEED")]),
    course: FieldAlias::new("course", &[FieldKey::Name("COURSE")]),
    heading: FieldAlias::new("heading", &[FieldKey::Name("HEADING")]),
    nav_status: FieldAlias::new("nav_status", &[FieldKey::Name("STATUS")]),
    destination: FieldAlias::new("destination", &[FieldKey::Name("DESTINATION")]),
    timestamp: FieldAlias::new("timestamp", &[FieldKey::Name("TIMESTAMP")]),
    speed_scale: 0.1,
};

/// MarineTraffic feed. Quality 0.90.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarineTrafficFeed;

impl Feed for MarineTrafficFeed {
    type Record = VesselRecord;

    fn source(&self) -> SourceId {
        SourceId::MarineTraffic
    }

    fn quality(&self) -> QualityBand {
        QUALITY
    }

    fn request(&self, config: &SourceConfig, bounds: &Bounds) -> HttpRequest {
        let url = format!(
            "{}/{}/MINLAT:{:.4}/MAXLAT:{:.4}/MINLON:{:.4}/MAXLON:{:.4}/protocol:jsono",
            config.base_url.trim_end_matches('/'),
            config.api_key.as_deref().unwrap_or_default(),
            bounds.min_lat,
            bounds.max_lat,
            bounds.min_lon,
            bounds.max_lon
        );
        HttpRequest::get(url, config.timeout)
    }

    fn split(&self, body: Value) -> Result<Payload, AdapterError> {
        match body {
            Value::Array(items) => Ok(Payload {
                items,
                reported_at: None,
            }),
            Value::Object(mut object) => {
                if let Some(errors) = object.get("errors") {
                    let detail = errors
                        .get(0)
                        .and_then(|e| e.get("detail"))
                        .and_then(Value::as_str)
                        .unwrap_or("provider returned errors");
                    return Err(AdapterError::Malformed(detail.to_string()));
                }
                match object.remove("DATA") {
                    Some(Value::Array(items)) => Ok(Payload {
                        items,
                        reported_at: None,
                    }),
                    _ => Err(AdapterError::Malformed("expected an array of vessels".into())),
                }
            }
            _ => Err(AdapterError::Malformed("expected an array of vessels".into())),
        }
    }

    fn map(&self, item: &Value, context: &MapContext) -> Option<VesselRecord> {
        FIELDS.map(item, self.source(), context.quality, context.reference_time)
    }

    fn render(&self, tracks: &[SyntheticTrack], at: DateTime<Utc>) -> Value {
        let timestamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let timestamp = timestamp.trim_end_matches('Z');
        Value::Array(
            tracks
                .iter()
                .map(|track| {
                    json!({
                        "MMSI": track.identity,
                        "IMO": track.imo.as_deref().unwrap_or("0"),
                        "SHIPNAME": track.name,
                        "CALLSIGN": track.callsign,
                        "LAT": format!("{:.5}", track.position.latitude),
                        "LON": format!("{:.5}", track.position.longitude),
                        "SPEED": (track.speed_kts * 10.0).round().to_string(),
                        "COURSE": format!("{:.0}", track.course_deg.floor()),
                        "HEADING": format!("{:.0}", track.course_deg.floor()),
                        "STATUS": nav_status_code(track.nav_status.as_deref().unwrap_or_default())
                            .to_string(),
                        "DESTINATION": track.destination,
                        "TIMESTAMP": timestamp,
                    })
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Position;
    use chrono::TimeZone;

    fn context() -> MapContext {
        MapContext::new(Utc.timestamp_opt(1_700_000_100, 0).unwrap(), 0.90)
    }

    #[test]
    fn test_map_uppercase_item() {
        let item = json!({
            "MMSI": "244660000", "IMO": "9434761", "SHIPNAME": "NORDIC STAR",
            "CALLSIGN": "PBXY", "LAT": "52.0012", "LON": "4.1201", "SPEED": "123",
            "COURSE": "270", "HEADING": "511", "STATUS": "0", "DESTINATION": "ROTTERDAM",
            "TIMESTAMP": "2023-11-14T22:13:20"
        });
        let record = MarineTrafficFeed.map(&item, &context()).unwrap();

        assert_eq!(record.mmsi, "244660000");
        assert_eq!(record.imo.as_deref(), Some("9434761"));
        assert_eq!(record.name.as_deref(), Some("NORDIC STAR"));
        assert_eq!(record.position, Position::new(52.0012, 4.1201));
        assert!((record.speed_kts.unwrap() - 12.3).abs() < 1e-9);
        assert_eq!(record.course_deg, Some(270.0));
        assert_eq!(record.heading_deg, None);
        assert_eq!(record.nav_status.as_deref(), Some("Under way using engine"));
        assert_eq!(record.timestamp, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        assert_eq!(record.data_quality, 0.90);
    }

    #[test]
    fn test_speed_sentinel_and_zero_imo() {
        let item = json!({"MMSI": 244660000, "IMO": 0, "LAT": 52.0, "LON": 4.0, "SPEED": 1023});
        let record = MarineTrafficFeed.map(&item, &context()).unwrap();
        assert_eq!(record.speed_kts, None);
        assert_eq!(record.imo, None);
        assert_eq!(record.timestamp, context().reference_time);
    }

    #[test]
    fn test_invalid_mmsi_is_still_mapped() {
        let item = json!({"MMSI": "123", "LAT": 52.0, "LON": 4.0});
        let record = MarineTrafficFeed.map(&item, &context()).unwrap();
        assert_eq!(record.mmsi, "123");
        assert!(!record.has_valid_mmsi());
    }

    #[test]
    fn test_missing_mmsi_is_dropped() {
        assert!(MarineTrafficFeed
            .map(&json!({"LAT": 52.0, "LON": 4.0}), &context())
            .is_none());
    }

    #[test]
    fn test_split_shapes() {
        assert_eq!(
            MarineTrafficFeed.split(json!([{"MMSI": "1"}])).unwrap().items.len(),
            1
        );
        assert_eq!(
            MarineTrafficFeed
                .split(json!({"DATA": [{"MMSI": "1"}, {"MMSI": "2"}]}))
                .unwrap()
                .items
                .len(),
            2
        );
        let err = MarineTrafficFeed
            .split(json!({"errors": [{"code": "3", "detail": "INVALID API KEY"}]}))
            .unwrap_err();
        assert_eq!(err, AdapterError::Malformed("INVALID API KEY".into()));
        assert!(MarineTrafficFeed.split(json!("nope")).is_err());
    }

    #[test]
    fn test_request_keeps_key_out_of_endpoint() {
        let mut config = SourceConfig::defaults(SourceId::MarineTraffic);
        config.base_url = "https://mt.test/exportvessels/v:8".into();
        config.api_key = Some("KEY".into());
        let request = MarineTrafficFeed.request(&config, &Bounds::new(50.0, 55.0, 0.0, 8.0));

        assert_eq!(
            request.url,
            "https://mt.test/exportvessels/v:8/KEY/MINLAT:50.0000/MAXLAT:55.0000/MINLON:0.0000/MAXLON:8.0000/protocol:jsono"
        );
        assert!(!MarineTrafficFeed.endpoint(&config).contains("KEY"));
    }

    #[test]
    fn test_render_round_trips_through_map() {
        let track = SyntheticTrack {
            identity: "244660000".into(),
            callsign: Some("PBXY".into()),
            name: Some("NORDIC STAR".into()),
            imo: Some("9434761".into()),
            position: Position::new(52.0, 4.0),
            speed_kts: 12.3,
            course_deg: 270.4,
            altitude_ft: None,
            vertical_rate_fpm: None,
            squawk: None,
            on_ground: false,
            nav_status: Some("Moored".into()),
            destination: Some("ROTTERDAM".into()),
        };
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let payload = MarineTrafficFeed
            .split(MarineTrafficFeed.render(&[track], at))
            .unwrap();
        let record = MarineTrafficFeed
            .map(&payload.items[0], &MapContext::new(at, 0.9))
            .unwrap();

        assert_eq!(record.mmsi, "244660000");
        assert!((record.speed_kts.unwrap() - 12.3).abs() < 1e-9);
        assert_eq!(record.course_deg, Some(270.0));
        assert_eq!(record.nav_status.as_deref(), Some("Moored"));
        assert_eq!(record.timestamp, at);
    }
}
