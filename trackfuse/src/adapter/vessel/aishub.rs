//! AISHub web service (`format=1`, JSON output).
//!
//! The body is a two-element array: a header object and the record list.
//!
//! ```json
//! [{"ERROR": false, "USERNAME": "...", "FORMAT": "HUMAN", "RECORDS": 1},
//!  [{"MMSI": 244660000, "TIME": "2023-11-14 22:13:20 GMT", "LONGITUDE": 4.12,
//!    "LATITUDE": 52.0, "COG": 270.1, "SOG": 12.3, "HEADING": 511, "NAVSTAT": 0,
//!    "IMO": 9434761, "NAME": "NORDIC STAR", "CALLSIGN": "PBXY", "DEST": "ROTTERDAM"}]]
//! ```
//!
//! When `ERROR` is true the header carries `ERROR_MESSAGE` and the list is
//! absent.

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

const QUALITY: QualityBand = QualityBand::fixed(0.70);

const FIELDS: VesselFields = VesselFields {
    mmsi: FieldAlias::new("mmsi", &[FieldKey::Name("MMSI")]),
    imo: FieldAlias::new("imo", &[FieldKey::Name("IMO")]),
    name: FieldAlias::new("name", &[FieldKey::Name("NAME")]),
    callsign: FieldAlias::new("callsign", &[FieldKey::Name("CALLSIGN")]),
    latitude: FieldAlias::new("latitude", &[FieldKey::Name("LATITUDE")]),
    longitude: FieldAlias::new("longitude", &[FieldKey::Name("LONGITUDE")]),
    speed: FieldAlias::new("speed", &[FieldKey::Name("SOG")]),
    course: FieldAlias::new("course", &[FieldKey::Name("COG")]),
    heading: FieldAlias::new("heading", &[FieldKey::Name("HEADING")]),
    nav_status: FieldAlias::new("nav_status", &[FieldKey::Name("NAVSTAT")]),
    destination: FieldAlias::new("destination", &[FieldKey::Name("DEST")]),
    timestamp: FieldAlias::new("timestamp", &[FieldKey::Name("TIME")]),
    speed_scale: 1.0,
};

/// AISHub feed. Quality 0.70. The configured API key is the AISHub
/// username.
#[derive(Debug, Clone, Copy, Default)]
pub struct AisHubFeed;

impl Feed for AisHubFeed {
    type Record = VesselRecord;

    fn source(&self) -> SourceId {
        SourceId::AisHub
    }

    fn quality(&self) -> QualityBand {
        QUALITY
    }

    fn request(&self, config: &SourceConfig, bounds: &Bounds) -> HttpRequest {
        let url = format!(
            "{}?username={}&format=1&output=json&compress=0&latmin={:.4}&latmax={:.4}&lonmin={:.4}&lonmax={:.4}",
            config.base_url,
            config.api_key.as_deref().unwrap_or_default(),
            bounds.min_lat,
            bounds.max_lat,
            bounds.min_lon,
            bounds.max_lon
        );
        HttpRequest::get(url, config.timeout)
    }

    fn split(&self, body: Value) -> Result<Payload, AdapterError> {
        let Value::Array(mut parts) = body else {
            return Err(AdapterError::Malformed("expected [header, records]".into()));
        };
        let header = parts.first().cloned().unwrap_or(Value::Null);
        if header.get("ERROR").and_then(Value::as_bool).unwrap_or(false) {
            let message = header
                .get("ERROR_MESSAGE")
                .and_then(Value::as_str)
                .unwrap_or("provider reported an error");
            return Err(AdapterError::Malformed(message.to_string()));
        }
        let items = match parts.get_mut(1).map(Value::take) {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => Vec::new(),
            Some(_) => return Err(AdapterError::Malformed("record list is not an array".into())),
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
        let time = at.format("%Y-%m-%d %H:%M:%S GMT").to_string();
        let records: Vec<Value> = tracks
            .iter()
            .map(|track| {
                json!({
                    "MMSI": track.identity.parse::<u64>().ok(),
                    "TIME": time,
                    "LONGITUDE": track.position.longitude,
                    "LATITUDE": track.position.latitude,
                    "COG": track.course_deg,
                    "SOG": track.speed_kts,
                    "HEADING": track.course_deg.round() as i64 % 360,
                    "NAVSTAT": nav_status_code(track.nav_status.as_deref().unwrap_or_default()),
                    "IMO": track.imo.as_deref().and_then(|imo| imo.parse::<u64>().ok()).unwrap_or(0),
                    "NAME": track.name,
                    "CALLSIGN": track.callsign,
                    "DEST": track.destination,
                })
            })
            .collect();
        json!([
            {"ERROR": false, "USERNAME": "simulated", "FORMAT": "HUMAN", "RECORDS": records.len()},
            records
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Position;
    use chrono::TimeZone;

    fn context() -> MapContext {
        MapContext::new(Utc.timestamp_opt(1_700_000_100, 0).unwrap(), 0.70)
    }

    #[test]
    fn test_split_header_and_records() {
        let payload = AisHubFeed
            .split(json!([
                {"ERROR": false, "RECORDS": 2},
                [{"MMSI": 1}, {"MMSI": 2}]
            ]))
            .unwrap();
        assert_eq!(payload.items.len(), 2);

        let empty = AisHubFeed
            .split(json!([{"ERROR": false, "RECORDS": 0}]))
            .unwrap();
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_split_error_header() {
        let err = AisHubFeed
            .split(json!([{"ERROR": true, "ERROR_MESSAGE": "Too frequent requests!"}]))
            .unwrap_err();
        assert_eq!(err, AdapterError::Malformed("Too frequent requests!".into()));
        assert!(AisHubFeed.split(json!({"ERROR": true})).is_err());
    }

    #[test]
    fn test_map_abbreviated_keys() {
        let item = json!({
            "MMSI": 244660000, "TIME": "2023-11-14 22:13:20 GMT", "LONGITUDE": 4.12,
            "LATITUDE": 52.0, "COG": 270.1, "SOG": 12.3, "HEADING": 511, "NAVSTAT": 15,
            "IMO": 0, "NAME": "NORDIC STAR", "CALLSIGN": "PBXY", "DEST": "ROTTERDAM"
        });
        let record = AisHubFeed.map(&item, &context()).unwrap();

        assert_eq!(record.mmsi, "244660000");
        assert_eq!(record.position, Position::new(52.0, 4.12));
        assert_eq!(record.course_deg, Some(270.1));
        assert_eq!(record.speed_kts, Some(12.3));
        assert_eq!(record.heading_deg, None);
        assert_eq!(record.nav_status, None);
        assert_eq!(record.imo, None);
        assert_eq!(record.destination.as_deref(), Some("ROTTERDAM"));
        assert_eq!(record.timestamp, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        assert_eq!(record.data_quality, 0.70);
    }

    #[test]
    fn test_request() {
        let mut config = SourceConfig::defaults(SourceId::AisHub);
        config.base_url = "https://aishub.test/ws.php".into();
        config.api_key = Some("AH_USER".into());
        let request = AisHubFeed.request(&config, &Bounds::new(50.0, 55.0, 0.0, 8.0));
        assert_eq!(
            request.url,
            "https://aishub.test/ws.php?username=AH_USER&format=1&output=json&compress=0&latmin=50.0000&latmax=55.0000&lonmin=0.0000&lonmax=8.0000"
        );
        assert_eq!(AisHubFeed.endpoint(&config), "https://aishub.test/ws.php");
    }

    #[test]
    fn test_render_round_trips_through_map() {
        let track = SyntheticTrack {
            identity: "211000000".into(),
            callsign: Some("DABC".into()),
            name: Some("BALTIC TRADER".into()),
            imo: None,
            position: Position::new(54.3, 10.1),
            speed_kts: 8.0,
            course_deg: 120.0,
            altitude_ft: None,
            vertical_rate_fpm: None,
            squawk: None,
            on_ground: false,
            nav_status: Some("At anchor".into()),
            destination: Some("HAMBURG".into()),
        };
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let payload = AisHubFeed.split(AisHubFeed.render(&[track], at)).unwrap();
        let record = AisHubFeed
            .map(&payload.items[0], &MapContext::new(at, 0.7))
            .unwrap();

        assert_eq!(record.mmsi, "211000000");
        assert_eq!(record.imo, None);
        assert_eq!(record.heading_deg, Some(120.0));
        assert_eq!(record.nav_status.as_deref(), Some("At anchor"));
        assert_eq!(record.destination.as_deref(), Some("HAMBURG"));
        assert_eq!(record.timestamp, at);
    }
}
