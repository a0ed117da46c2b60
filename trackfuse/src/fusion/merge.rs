//! Field-wise merge with provenance tracking.

use crate::record::{PositionReport, SourceId};

/// Picks each field from the best-ranked contributor that has it.
///
/// Contributors are ordered best first. Every successful pick marks the
/// contributor it came from so the fused record can report which sources
/// actually supplied data.
#[derive(Debug)]
pub struct FieldPicker<'a, R> {
    ranked: &'a [&'a R],
    leader: &'a R,
    contributed: Vec<bool>,
}

impl<'a, R: PositionReport> FieldPicker<'a, R> {
    /// Create a picker over `ranked`, or `None` if there are no contributors.
    pub fn new(ranked: &'a [&'a R]) -> Option<Self> {
        let leader = *ranked.first()?;
        Some(Self {
            ranked,
            leader,
            contributed: vec![false; ranked.len()],
        })
    }

    /// The best-ranked contributor. Marks it as contributing.
    pub fn leader(&mut self) -> &'a R {
        self.contributed[0] = true;
        self.leader
    }

    /// First present value of `field` in rank order.
    pub fn pick<T>(&mut self, field: impl Fn(&R) -> Option<T>) -> Option<T> {
        for (index, record) in self.ranked.iter().enumerate() {
            if let Some(value) = field(record) {
                self.contributed[index] = true;
                return Some(value);
            }
        }
        None
    }

    /// Highest quality among all contributors.
    pub fn max_quality(&self) -> f64 {
        self.ranked
            .iter()
            .map(|r| r.data_quality())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Sources that supplied at least one picked value, in rank order.
    pub fn contributors(&self) -> Vec<SourceId> {
        self.ranked
            .iter()
            .zip(&self.contributed)
            .filter(|(_, used)| **used)
            .map(|(record, _)| record.source())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AircraftRecord, Position};
    use chrono::Utc;

    fn aircraft(source: SourceId, quality: f64) -> AircraftRecord {
        AircraftRecord::new(
            "ABC123",
            Position::new(51.0, 0.0),
            Utc::now(),
            source,
            quality,
        )
    }

    #[test]
    fn test_empty_contributors_yield_no_picker() {
        let ranked: Vec<&AircraftRecord> = Vec::new();
        assert!(FieldPicker::new(&ranked).is_none());
    }

    #[test]
    fn test_pick_backfills_from_lower_rank() {
        let mut best = aircraft(SourceId::AdsbExchange, 0.95);
        best.altitude_ft = Some(35000.0);
        let mut other = aircraft(SourceId::OpenSky, 0.8);
        other.squawk = Some("7000".to_string());
        other.altitude_ft = Some(34000.0);

        let ranked = vec![&best, &other];
        let mut picker = FieldPicker::new(&ranked).unwrap();
        assert_eq!(picker.pick(|r| r.altitude_ft), Some(35000.0));
        assert_eq!(picker.pick(|r| r.squawk.clone()), Some("7000".to_string()));
        assert_eq!(picker.pick(|r| r.heading_deg), None);
        assert_eq!(
            picker.contributors(),
            vec![SourceId::AdsbExchange, SourceId::OpenSky]
        );
    }

    #[test]
    fn test_unused_contributor_not_reported() {
        let mut best = aircraft(SourceId::AdsbExchange, 0.95);
        best.altitude_ft = Some(35000.0);
        let other = aircraft(SourceId::OpenSky, 0.8);

        let ranked = vec![&best, &other];
        let mut picker = FieldPicker::new(&ranked).unwrap();
        picker.leader();
        picker.pick(|r| r.altitude_ft);
        assert_eq!(picker.contributors(), vec![SourceId::AdsbExchange]);
        assert_eq!(picker.max_quality(), 0.95);
    }
}
