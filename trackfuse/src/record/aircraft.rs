//! Canonical aircraft position record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityClass, Position, PositionReport, SourceId};
use crate::fusion::FieldPicker;

/// An aircraft position report in canonical units.
///
/// Altitude is in feet, ground speed in knots, vertical rate in feet per
/// minute, track and heading in degrees true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftRecord {
    /// ICAO 24-bit address as six uppercase hex digits.
    pub hex: String,
    pub callsign: Option<String>,
    pub position: Position,
    pub altitude_ft: Option<f64>,
    pub ground_speed_kts: Option<f64>,
    pub track_deg: Option<f64>,
    pub heading_deg: Option<f64>,
    pub vertical_rate_fpm: Option<f64>,
    pub squawk: Option<String>,
    pub on_ground: Option<bool>,
    pub timestamp: DateTime<Utc>,
    pub source: SourceId,
    pub data_quality: f64,
    /// Original provider payload, kept for audit only.
    pub raw: serde_json::Value,
}

impl AircraftRecord {
    /// Create a record with only the mandatory fields populated.
    pub fn new(
        hex: impl Into<String>,
        position: Position,
        timestamp: DateTime<Utc>,
        source: SourceId,
        data_quality: f64,
    ) -> Self {
        Self {
            hex: hex.into(),
            callsign: None,
            position,
            altitude_ft: None,
            ground_speed_kts: None,
            track_deg: None,
            heading_deg: None,
            vertical_rate_fpm: None,
            squawk: None,
            on_ground: None,
            timestamp,
            source,
            data_quality,
            raw: serde_json::Value::Null,
        }
    }
}

impl PositionReport for AircraftRecord {
    const CLASS: EntityClass = EntityClass::Aircraft;

    fn identity(&self) -> &str {
        &self.hex
    }

    fn secondary_identity(&self) -> Option<&str> {
        self.callsign.as_deref()
    }

    fn position(&self) -> Position {
        self.position
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn source(&self) -> SourceId {
        self.source
    }

    fn data_quality(&self) -> f64 {
        self.data_quality
    }

    fn set_data_quality(&mut self, quality: f64) {
        self.data_quality = quality;
    }

    fn merge_ranked(picker: &mut FieldPicker<'_, Self>) -> Self {
        let leader = picker.leader();
        Self {
            hex: leader.hex.clone(),
            callsign: picker.pick(|r| r.callsign.clone()),
            position: leader.position,
            altitude_ft: picker.pick(|r| r.altitude_ft),
            ground_speed_kts: picker.pick(|r| r.ground_speed_kts),
            track_deg: picker.pick(|r| r.track_deg),
            heading_deg: picker.pick(|r| r.heading_deg),
            vertical_rate_fpm: picker.pick(|r| r.vertical_rate_fpm),
            squawk: picker.pick(|r| r.squawk.clone()),
            on_ground: picker.pick(|r| r.on_ground),
            timestamp: leader.timestamp,
            source: leader.source,
            data_quality: leader.data_quality,
            raw: leader.raw.clone(),
        }
    }
}

/// Normalize an ICAO hex address to six uppercase hex digits.
///
/// Strips whitespace and the `~` prefix some feeds use for non-ICAO
/// (TIS-B) addresses. Returns `None` for anything that is not exactly six
/// hex digits afterwards.
pub fn normalize_hex(raw: &str) -> Option<String> {
    let hex = raw.trim().trim_start_matches('~');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hex.to_ascii_uppercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("abc123"), Some("ABC123".to_string()));
        assert_eq!(normalize_hex(" 4ca7b5 "), Some("4CA7B5".to_string()));
        assert_eq!(normalize_hex("~a1b2c3"), Some("A1B2C3".to_string()));
        assert_eq!(normalize_hex("abc12"), None);
        assert_eq!(normalize_hex("abc1234"), None);
        assert_eq!(normalize_hex("xyz123"), None);
        assert_eq!(normalize_hex(""), None);
    }

    #[test]
    fn test_new_record_has_only_mandatory_fields() {
        let record = AircraftRecord::new(
            "ABC123",
            Position::new(51.5, -0.1),
            Utc::now(),
            SourceId::OpenSky,
            0.8,
        );
        assert_eq!(record.identity(), "ABC123");
        assert!(record.secondary_identity().is_none());
        assert!(record.altitude_ft.is_none());
        assert!(record.has_fusable_identity());
        assert_eq!(AircraftRecord::CLASS, EntityClass::Aircraft);
    }
}
