//! Canonical vessel position record.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{EntityClass, Position, PositionReport, SourceId};
use crate::fusion::FieldPicker;

/// A vessel position report in canonical units.
///
/// Speed over ground is in knots, course and heading in degrees true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselRecord {
    /// Maritime Mobile Service Identity as reported.
    pub mmsi: String,
    pub imo: Option<String>,
    pub name: Option<String>,
    pub callsign: Option<String>,
    pub position: Position,
    pub speed_kts: Option<f64>,
    pub course_deg: Option<f64>,
    pub heading_deg: Option<f64>,
    pub nav_status: Option<String>,
    pub destination: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub source: SourceId,
    pub data_quality: f64,
    /// Original provider payload, kept for audit only.
    pub raw: serde_json::Value,
}

impl VesselRecord {
    /// Create a record with only the mandatory fields populated.
    pub fn new(
        mmsi: impl Into<String>,
        position: Position,
        timestamp: DateTime<Utc>,
        source: SourceId,
        data_quality: f64,
    ) -> Self {
        Self {
            mmsi: mmsi.into(),
            imo: None,
            name: None,
            callsign: None,
            position,
            speed_kts: None,
            course_deg: None,
            heading_deg: None,
            nav_status: None,
            destination: None,
            timestamp,
            source,
            data_quality,
            raw: serde_json::Value::Null,
        }
    }

    pub fn has_valid_mmsi(&self) -> bool {
        has_valid_mmsi(&self.mmsi)
    }
}

impl PositionReport for VesselRecord {
    const CLASS: EntityClass = EntityClass::Vessel;

    fn identity(&self) -> &str {
        &self.mmsi
    }

    fn secondary_identity(&self) -> Option<&str> {
        self.imo.as_deref().or(self.callsign.as_deref())
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

    fn has_fusable_identity(&self) -> bool {
        self.has_valid_mmsi()
    }

    fn merge_ranked(picker: &mut FieldPicker<'_, Self>) -> Self {
        let leader = picker.leader();
        Self {
            mmsi: leader.mmsi.clone(),
            imo: picker.pick(|r| r.imo.clone()),
            name: picker.pick(|r| r.name.clone()),
            callsign: picker.pick(|r| r.callsign.clone()),
            position: leader.position,
            speed_kts: picker.pick(|r| r.speed_kts),
            course_deg: picker.pick(|r| r.course_deg),
            heading_deg: picker.pick(|r| r.heading_deg),
            nav_status: picker.pick(|r| r.nav_status.clone()),
            destination: picker.pick(|r| r.destination.clone()),
            timestamp: leader.timestamp,
            source: leader.source,
            data_quality: leader.data_quality,
            raw: leader.raw.clone(),
        }
    }
}

fn mmsi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{9}$").expect("MMSI pattern is valid"))
}

/// True when `mmsi` is exactly nine ASCII digits.
pub fn has_valid_mmsi(mmsi: &str) -> bool {
    mmsi_pattern().is_match(mmsi)
}
