//! Property tests for the fusion engine.
//!
//! Run with: `cargo test --test fusion_properties`

use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use trackfuse::fusion::FusionEngine;
use trackfuse::record::{AircraftRecord, Position, SourceId, VesselRecord};

const HEXES: &[&str] = &["ABC123", "DEF456", "4CA1B2", "3C6586"];
const AIRCRAFT_SOURCES: &[SourceId] = &[SourceId::AdsbExchange, SourceId::OpenSky];

fn aircraft_record() -> impl Strategy<Value = AircraftRecord> {
    (
        prop::sample::select(HEXES),
        prop::sample::select(AIRCRAFT_SOURCES),
        -100.0f64..100.0,
        -190.0f64..190.0,
        0.0f64..=1.0,
        prop::option::of(0.0f64..45_000.0),
        prop::option::of("[A-Z]{3}[0-9]{2,4}"),
        prop::option::of(0.0f64..600.0),
        0i64..600,
    )
        .prop_map(
            |(hex, source, lat, lon, quality, altitude, callsign, speed, age)| {
                let timestamp =
                    Utc.timestamp_opt(1_700_000_000, 0).unwrap() - Duration::seconds(age);
                let mut record =
                    AircraftRecord::new(hex, Position::new(lat, lon), timestamp, source, quality);
                record.altitude_ft = altitude;
                record.callsign = callsign;
                record.ground_speed_kts = speed;
                record
            },
        )
}

/// Records with at most one report per (identity, source), as a single
/// fetch cycle produces.
fn cycle_records() -> impl Strategy<Value = Vec<AircraftRecord>> {
    prop::collection::vec(aircraft_record(), 0..16).prop_map(|records| {
        let mut seen = HashSet::new();
        records
            .into_iter()
            .filter(|r| seen.insert((r.hex.clone(), r.source)))
            .collect()
    })
}

/// One cycle plus same-source twins that tie exactly on timestamp, quality
/// and position and differ only in their optional fields.
fn records_with_duplicates() -> impl Strategy<Value = Vec<AircraftRecord>> {
    (
        cycle_records(),
        prop::collection::vec(
            (
                any::<prop::sample::Index>(),
                prop::option::of(0.0f64..45_000.0),
                prop::option::of("[A-Z]{3}[0-9]{2,4}"),
            ),
            0..8,
        ),
    )
        .prop_map(|(mut records, twins)| {
            if records.is_empty() {
                return records;
            }
            let extra: Vec<_> = twins
                .into_iter()
                .map(|(index, altitude, callsign)| {
                    let mut twin = index.get(&records).clone();
                    twin.altitude_ft = altitude;
                    twin.callsign = callsign;
                    twin
                })
                .collect();
            records.extend(extra);
            records
        })
}

proptest! {
    #[test]
    fn fusion_with_duplicates_is_order_independent(
        (records, shuffled) in records_with_duplicates()
            .prop_flat_map(|records| (Just(records.clone()), Just(records).prop_shuffle()))
    ) {
        let engine = FusionEngine::new();
        prop_assert_eq!(engine.merge(records), engine.merge(shuffled));
    }

    #[test]
    fn quality_is_group_maximum_with_duplicates(records in records_with_duplicates()) {
        let fused = FusionEngine::new().merge(records.clone());

        for f in &fused {
            let best = records
                .iter()
                .filter(|r| r.hex == f.identity && r.position.is_valid())
                .map(|r| r.data_quality)
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(f.data_quality, best);
        }
    }

    #[test]
    fn fused_quality_is_group_maximum(records in cycle_records()) {
        let fused = FusionEngine::new().merge(records.clone());

        for f in &fused {
            let best = records
                .iter()
                .filter(|r| r.hex == f.identity && r.position.is_valid())
                .map(|r| r.data_quality)
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(f.data_quality, best);
            prop_assert_eq!(f.record.data_quality, best);
        }
    }

    #[test]
    fn invalid_positions_never_fused(records in cycle_records()) {
        let fused = FusionEngine::new().merge(records.clone());

        for f in &fused {
            prop_assert!(f.record.position.is_valid());
        }
        let valid_identities: HashSet<_> = records
            .iter()
            .filter(|r| r.position.is_valid())
            .map(|r| r.hex.clone())
            .collect();
        let fused_identities: HashSet<_> = fused.iter().map(|f| f.identity.clone()).collect();
        prop_assert_eq!(fused_identities, valid_identities);
    }

    #[test]
    fn fusion_is_order_independent(
        (records, shuffled) in cycle_records()
            .prop_flat_map(|records| (Just(records.clone()), Just(records).prop_shuffle()))
    ) {
        let engine = FusionEngine::new();
        prop_assert_eq!(engine.merge(records), engine.merge(shuffled));
    }

    #[test]
    fn single_record_passes_through(record in aircraft_record()) {
        prop_assume!(record.position.is_valid());

        let fused = FusionEngine::new().merge(vec![record.clone()]);

        prop_assert_eq!(fused.len(), 1);
        prop_assert_eq!(&fused[0].record, &record);
        prop_assert_eq!(fused[0].data_quality, record.data_quality);
        prop_assert_eq!(&fused[0].contributing_sources, &vec![record.source]);
    }

    #[test]
    fn best_source_field_wins_when_present(
        altitude_a in 0.0f64..45_000.0,
        altitude_b in prop::option::of(0.0f64..45_000.0),
    ) {
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let position = Position::new(51.0, 0.0);
        let mut a = AircraftRecord::new("ABC123", position, at, SourceId::AdsbExchange, 0.95);
        a.altitude_ft = Some(altitude_a);
        let mut b = AircraftRecord::new("ABC123", position, at, SourceId::OpenSky, 0.80);
        b.altitude_ft = altitude_b;

        let fused = FusionEngine::new().merge(vec![b, a]);
        prop_assert_eq!(fused[0].record.altitude_ft, Some(altitude_a));
        prop_assert_eq!(fused[0].data_quality, 0.95);
    }
}

#[test]
fn invalid_mmsi_excluded_from_vessel_fusion() {
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let records = vec![
        VesselRecord::new("123", Position::new(52.0, 4.0), at, SourceId::AisHub, 0.7),
        VesselRecord::new("244660000", Position::new(52.0, 4.0), at, SourceId::AisHub, 0.7),
    ];

    let output = FusionEngine::new().merge_with_stats(records);

    assert_eq!(output.fused.len(), 1);
    assert_eq!(output.fused[0].identity, "244660000");
    assert_eq!(output.stats.unfusable_identity, 1);
}

#[test]
fn coincident_positions_are_not_deduplicated() {
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let records = vec![
        AircraftRecord::new("ABC123", Position::new(0.0, 0.0), at, SourceId::AdsbExchange, 0.95),
        AircraftRecord::new("DEF456", Position::new(0.0, 0.0), at, SourceId::OpenSky, 0.80),
    ];

    assert_eq!(FusionEngine::new().merge(records).len(), 2);
}
