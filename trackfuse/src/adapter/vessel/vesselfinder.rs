//! VesselFinder `vesselslist`.
//!
//! The body is an array of envelopes, each wrapping the AIS block:
//! `[{"AIS": {"MMSI": 244660000, "TIMESTAMP": "2023-11-14 22:13:20 UTC", ...}}]`.
//! The endpoint returns the account's fleet, so bounds are applied only by
//! filtering.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::{nav_status_code, VesselFields};
use crate::adapter::feed::{Feed, MapContext, Payload};
use crate::adapter::fields::{FieldAlias, FieldKey};
use crate::adapter::simulation::SyntheticTrack;
use crate::adapter::types::{AdapterError, QualityBand};
use crate::config::SourceConfig;
use crate::provider::HttpRequest;
use crate::record::{Bounds, SourceId, VesselRecord};

const QUALITY: QualityBand = QualityBand::fixed(0.85);

const FIELDS: VesselFields = VesselFields {
    mmsi: FieldAlias::new("mmsi", &[FieldKey::Name("MMSI")]),
    imo: FieldAlias::new("imo", &[FieldKey::Name("IMO")]),
    name: FieldAlias::new("name", &[FieldKey::Name("NAME")]),
    callsign: FieldAlias::new("callsign", &[FieldKey::Name("CALLSIGN")]),
    latitude: FieldAlias::new("latitude", &[FieldKey::Name("LATITUDE")]),
    longitude: FieldAlias::new("longitude", &[FieldKey::Name("LONGITUDE")]),
    speed: FieldAlias::new("speed", &[FieldKey::Name("SPEED")]),
    course: FieldAlias::new("course", &[FieldKey::Name("COURSE")]),
    heading: FieldAlias::new("heading", &[FieldKey::Name("HEADING")]),
    nav_status: FieldAlias::new("nav_status", &[FieldKey::Name("NAVSTAT")]),
    destination: FieldAlias::new("destination", &[FieldKey::Name("DESTINATION")]),
    timestamp: FieldAlias::new("timestamp", &[FieldKey::Name("TIMESTAMP")]),
    speed_scale: 1.0,
};

/// VesselFinder feed. Quality 0.85.
#[derive(Debug, Clone, Copy, Default)]
pub struct VesselFinderFeed;

impl Feed for VesselFinderFeed {
    type Record = VesselRecord;

    fn source(&self) -> SourceId {
        SourceId::VesselFinder
    }

    fn quality(&self) -> QualityBand {
        QUALITY
    }

    fn request(&self, config: &SourceConfig, _bounds: &Bounds) -> HttpRequest {
        let url = format!(
            "{}/vesselslist?userkey={}",
            config.base_url.trim_end_matches('/'),
            config.api_key.as_deref().unwrap_or_default()
        );
        HttpRequest::get(url, config.timeout)
    }

    fn endpoint(&self, config: &SourceConfig) -> String {
        format!("{}/vesselslist", config.base_url.trim_end_matches('/'))
    }

    fn split(&self, body: Value) -> Result<Payload, AdapterError> {
        let envelopes = match body {
            Value::Array(envelopes) => envelopes,
            Value::Object(object) => {
                let message = object
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("expected an array of vessels");
                return Err(AdapterError::Malformed(message.to_string()));
            }
            _ => return Err(AdapterError::Malformed("expected an array of vessels".into())),
        };
        let items = envelopes
            .into_iter()
            .map(|mut envelope| {
                if envelope.get("AIS").is_some() {
                    envelope["AIS"].take()
                } else {
                    envelope
                }
            })
            .collect();
        Ok(Payload {
            items,
            reported_at: None,
        })
    }

    fn map(&self, item: &Value, context: &MapContext) -> Option<VesselRecord> {
        FIELDS.map(item, self.source(), context.quality, context.reference_time)
    }

    fn render(&self, tracks: &[SyntheticTrack], at: DateTime<Utc>) -> Value {
        let timestamp = at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
        Value::Array(
            tracks
                .iter()
                .map(|track| {
                    json!({
                        "AIS": {
                            "MMSI": track.identity.parse::<u64>().ok(),
                            "TIMESTAMP": timestamp,
                            "LATITUDE": track.position.latitude,
                            "LONGITUDE": track.position.longitude,
                            "COURSE": track.course_deg,
                            "SPEED": track.speed_kts,
                            "HEADING": 511,
                            "NAVSTAT": nav_status_code(track.nav_status.as_deref().unwrap_or_default()),
                            "IMO": track.imo.as_deref().and_then(|imo| imo.parse::<u64>().ok()),
                            "NAME": track.name,
                            "CALLSIGN": track.callsign,
                            "DESTINATION": track.destination,
                        }
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
        MapContext::new(Utc.timestamp_opt(1_700_000_100, 0).unwrap(), 0.85)
    }

    #[test]
    fn test_split_unwraps_envelopes() {
        let payload = VesselFinderFeed
            .split(json!([
                {"AIS": {"MMSI": 244660000, "LATITUDE": 52.0, "LONGITUDE": 4.0}},
                {"AIS": {"MMSI": 211000000, "LATITUDE": 54.0, "LONGITUDE": 8.0}}
            ]))
            .unwrap();
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.items[0]["MMSI"], json!(244660000));
    }

    #[test]
    fn test_split_error_object() {
        let err = VesselFinderFeed
            .split(json!({"error": "Expired account"}))
            .unwrap_err();
        assert_eq!(err, AdapterError::Malformed("Expired account".into()));
    }

    #[test]
    fn test_map_item() {
        let item = json!({
            "MMSI": 244660000, "TIMESTAMP": "2023-11-14 22:13:20 UTC",
            "LATITUDE": 52.0012, "LONGITUDE": 4.1201, "COURSE": 360, "SPEED": 102.3,
            "HEADING": 87, "NAVSTAT": 1, "IMO": 9434761, "NAME": "NORDIC STAR ",
            "CALLSIGN": "PBXY", "DESTINATION": ""
        });
        let record = VesselFinderFeed.map(&item, &context()).unwrap();

        assert_eq!(record.mmsi, "244660000");
        assert_eq!(record.position, Position::new(52.0012, 4.1201));
        assert_eq!(record.course_deg, None);
        assert_eq!(record.speed_kts, None);
        assert_eq!(record.heading_deg, Some(87.0));
        assert_eq!(record.nav_status.as_deref(), Some("At anchor"));
        assert_eq!(record.imo.as_deref(), Some("9434761"));
        assert_eq!(record.name.as_deref(), Some("NORDIC STAR"));
        assert_eq!(record.destination, None);
        assert_eq!(record.timestamp, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    }

    #[test]
    fn test_request_and_endpoint() {
        let mut config = SourceConfig::defaults(SourceId::VesselFinder);
        config.base_url = "https://vf.test".into();
        config.api_key = Some("uk".into());
        let request = VesselFinderFeed.request(&config, &Bounds::WORLD);
        assert_eq!(request.url, "https://vf.test/vesselslist?userkey=uk");
        assert_eq!(VesselFinderFeed.endpoint(&config), "https://vf.test/vesselslist");
    }

    #[test]
    fn test_render_round_trips_through_map() {
        let track = SyntheticTrack {
            identity: "244660000".into(),
            callsign: None,
            name: Some("EVER GIVEN".into()),
            imo: Some("9811000".into()),
            position: Position::new(51.9, 4.3),
            speed_kts: 11.5,
            course_deg: 45.0,
            altitude_ft: None,
            vertical_rate_fpm: None,
            squawk: None,
            on_ground: false,
            nav_status: Some("Under way using engine".into()),
            destination: None,
        };
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let payload = VesselFinderFeed
            .split(VesselFinderFeed.render(&[track], at))
            .unwrap();
        let record = VesselFinderFeed
            .map(&payload.items[0], &MapContext::new(at, 0.85))
            .unwrap();

        assert_eq!(record.mmsi, "244660000");
        assert_eq!(record.imo.as_deref(), Some("9811000"));
        assert_eq!(record.speed_kts, Some(11.5));
        assert_eq!(record.heading_deg, None);
        assert_eq!(record.timestamp, at);
    }
}
