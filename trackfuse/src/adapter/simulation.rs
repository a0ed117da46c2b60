//! Deterministic synthetic traffic for simulated adapters.
//!
//! One [`SyntheticFleet`] exists per entity class and is shared by every
//! simulated adapter of that class. Tracks are seeded once and dead-reckoned
//! from the fleet epoch, so two sources observing the fleet at the same
//! instant see the same entities at (almost) the same place. Each source
//! sees its own subset of the fleet with a little positional noise, which is
//! what makes cross-source fusion worth doing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::record::{Bounds, EntityClass, Position, SourceId};

/// Default number of aircraft in a synthetic fleet.
pub const DEFAULT_AIRCRAFT_FLEET_SIZE: usize = 40;

/// Default number of vessels in a synthetic fleet.
pub const DEFAULT_VESSEL_FLEET_SIZE: usize = 60;

/// Default seed when the configuration does not set one.
pub const DEFAULT_SEED: u64 = 0x7EAC_F05E;

/// Positional noise, in degrees, applied per observation.
const OBSERVATION_NOISE_DEG: f64 = 0.002;

const CALLSIGN_PREFIXES: &[&str] = &["BAW", "DLH", "AFR", "KLM", "RYR", "EZY", "UAL", "SAS"];
const VESSEL_NAMES: &[&str] = &[
    "NORDIC STAR",
    "MAERSK ELBA",
    "EVER GIVEN",
    "STENA DANICA",
    "ATLANTIC SPIRIT",
    "PACIFIC DAWN",
    "BALTIC TRADER",
    "OCEAN BREEZE",
];
const DESTINATIONS: &[&str] = &["ROTTERDAM", "HAMBURG", "FELIXSTOWE", "ANTWERP", "GOTHENBURG"];
const NAV_STATUSES: &[&str] = &["Under way using engine", "At anchor", "Moored"];

/// One entity's state at an instant, in canonical units.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticTrack {
    /// ICAO hex (uppercase) or MMSI.
    pub identity: String,
    pub callsign: Option<String>,
    pub name: Option<String>,
    pub imo: Option<String>,
    pub position: Position,
    pub speed_kts: f64,
    pub course_deg: f64,
    pub altitude_ft: Option<f64>,
    pub vertical_rate_fpm: Option<f64>,
    pub squawk: Option<String>,
    pub on_ground: bool,
    pub nav_status: Option<String>,
    pub destination: Option<String>,
}

/// What one source sees of the fleet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleetView {
    pub source: SourceId,
    /// Share of the fleet reported, in [0, 1].
    pub coverage: f64,
}

/// A seeded set of tracks moving in straight lines inside `bounds`.
#[derive(Debug)]
pub struct SyntheticFleet {
    class: EntityClass,
    seed: u64,
    bounds: Bounds,
    epoch: DateTime<Utc>,
    initial: Vec<SyntheticTrack>,
}

impl SyntheticFleet {
    /// Create a fleet whose epoch is now.
    pub fn new(class: EntityClass, size: usize, seed: u64, bounds: Bounds) -> Self {
        Self::with_epoch(class, size, seed, bounds, Utc::now())
    }

    /// Create a fleet with an explicit epoch, for reproducible output.
    pub fn with_epoch(
        class: EntityClass,
        size: usize,
        seed: u64,
        bounds: Bounds,
        epoch: DateTime<Utc>,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen = HashSet::with_capacity(size);
        let mut initial = Vec::with_capacity(size);

        while initial.len() < size {
            let track = match class {
                EntityClass::Aircraft => random_aircraft(&mut rng, &bounds),
                EntityClass::Vessel => random_vessel(&mut rng, &bounds),
            };
            if seen.insert(track.identity.clone()) {
                initial.push(track);
            }
        }

        Self {
            class,
            seed,
            bounds,
            epoch,
            initial,
        }
    }

    pub fn class(&self) -> EntityClass {
        self.class
    }

    pub fn len(&self) -> usize {
        self.initial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initial.is_empty()
    }

    /// True positions of every track at `at`.
    pub fn tracks_at(&self, at: DateTime<Utc>) -> Vec<SyntheticTrack> {
        let hours = (at - self.epoch).num_milliseconds() as f64 / 3_600_000.0;
        self.initial
            .iter()
            .map(|track| self.advance(track, hours))
            .collect()
    }

    /// The subset of tracks `view.source` reports at `at`, with noise.
    ///
    /// Deterministic for a given fleet, view and whole second.
    pub fn observe(&self, view: FleetView, at: DateTime<Utc>) -> Vec<SyntheticTrack> {
        let mut rng = StdRng::seed_from_u64(
            self.seed ^ ((view.source as u64 + 1) << 48) ^ at.timestamp() as u64,
        );
        let coverage = view.coverage.clamp(0.0, 1.0);
        self.tracks_at(at)
            .into_iter()
            .filter_map(|mut track| {
                if !rng.random_bool(coverage) {
                    return None;
                }
                let lat = track.position.latitude
                    + rng.random_range(-OBSERVATION_NOISE_DEG..=OBSERVATION_NOISE_DEG);
                let lon = track.position.longitude
                    + rng.random_range(-OBSERVATION_NOISE_DEG..=OBSERVATION_NOISE_DEG);
                track.position = Position::new(lat.clamp(-90.0, 90.0), lon.clamp(-180.0, 180.0));
                Some(track)
            })
            .collect()
    }

    fn advance(&self, track: &SyntheticTrack, hours: f64) -> SyntheticTrack {
        let distance_nm = track.speed_kts * hours;
        let course = track.course_deg.to_radians();
        let start = track.position;

        let dlat = distance_nm * course.cos() / 60.0;
        let lat_scale = start.latitude.to_radians().cos().max(0.1);
        let dlon = distance_nm * course.sin() / (60.0 * lat_scale);

        let mut moved = track.clone();
        moved.position = Position::new(
            wrap(start.latitude + dlat, self.bounds.min_lat, self.bounds.max_lat),
            wrap(start.longitude + dlon, self.bounds.min_lon, self.bounds.max_lon),
        );
        moved
    }
}

/// Fold `value` back into `[min, max]`.
fn wrap(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span <= 0.0 {
        return min;
    }
    min + (value - min).rem_euclid(span)
}

fn random_position(rng: &mut StdRng, bounds: &Bounds) -> Position {
    let lat = if bounds.lat_span() > 0.0 {
        rng.random_range(bounds.min_lat..bounds.max_lat)
    } else {
        bounds.min_lat
    };
    let lon = if bounds.lon_span() > 0.0 {
        rng.random_range(bounds.min_lon..bounds.max_lon)
    } else {
        bounds.min_lon
    };
    Position::new(lat, lon)
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

fn random_aircraft(rng: &mut StdRng, bounds: &Bounds) -> SyntheticTrack {
    let on_ground = rng.random_bool(0.05);
    SyntheticTrack {
        identity: format!("{:06X}", rng.random_range(0x30_0000u32..=0xAF_FFFF)),
        callsign: Some(format!(
            "{}{}",
            pick(rng, CALLSIGN_PREFIXES),
            rng.random_range(10..9999)
        )),
        name: None,
        imo: None,
        position: random_position(rng, bounds),
        speed_kts: if on_ground {
            rng.random_range(0.0..25.0)
        } else {
            rng.random_range(180.0..490.0)
        },
        course_deg: rng.random_range(0.0..360.0),
        altitude_ft: Some(if on_ground {
            0.0
        } else {
            (rng.random_range(30..400) * 100) as f64
        }),
        vertical_rate_fpm: Some(if on_ground {
            0.0
        } else {
            (rng.random_range(-20..=20) * 64) as f64
        }),
        squawk: Some(format!("{:04o}", rng.random_range(0o1000u32..0o7777))),
        on_ground,
        nav_status: None,
        destination: None,
    }
}

fn random_vessel(rng: &mut StdRng, bounds: &Bounds) -> SyntheticTrack {
    let anchored = rng.random_bool(0.15);
    SyntheticTrack {
        identity: rng.random_range(200_000_000u32..=775_999_999).to_string(),
        callsign: Some(format!(
            "{}{}",
            (b'A' + rng.random_range(0..26u8)) as char,
            rng.random_range(1000..9999)
        )),
        name: Some(pick(rng, VESSEL_NAMES).to_string()),
        imo: Some(rng.random_range(9_000_000u32..9_999_999).to_string()),
        position: random_position(rng, bounds),
        speed_kts: if anchored {
            0.0
        } else {
            rng.random_range(4.0..22.0)
        },
        course_deg: rng.random_range(0.0..360.0),
        altitude_ft: None,
        vertical_rate_fpm: None,
        squawk: None,
        on_ground: false,
        nav_status: Some(
            if anchored {
                NAV_STATUSES[1]
            } else {
                pick(rng, &NAV_STATUSES[..1])
            }
            .to_string(),
        ),
        destination: Some(pick(rng, DESTINATIONS).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn north_sea() -> Bounds {
        Bounds::new(50.0, 60.0, -5.0, 10.0)
    }

    #[test]
    fn test_fleet_is_deterministic() {
        let a = SyntheticFleet::with_epoch(EntityClass::Vessel, 20, 42, north_sea(), epoch());
        let b = SyntheticFleet::with_epoch(EntityClass::Vessel, 20, 42, north_sea(), epoch());
        assert_eq!(a.tracks_at(epoch()), b.tracks_at(epoch()));
        assert_eq!(a.len(), 20);
    }

    #[test]
    fn test_identities_are_unique_and_well_formed() {
        let fleet = SyntheticFleet::with_epoch(EntityClass::Aircraft, 50, 1, north_sea(), epoch());
        let tracks = fleet.tracks_at(epoch());
        let ids: HashSet<_> = tracks.iter().map(|t| t.identity.clone()).collect();
        assert_eq!(ids.len(), 50);
        assert!(tracks.iter().all(|t| t.identity.len() == 6));

        let vessels = SyntheticFleet::with_epoch(EntityClass::Vessel, 50, 1, north_sea(), epoch());
        assert!(vessels
            .tracks_at(epoch())
            .iter()
            .all(|t| crate::record::has_valid_mmsi(&t.identity)));
    }

    #[test]
    fn test_tracks_stay_inside_bounds() {
        let bounds = north_sea();
        let fleet = SyntheticFleet::with_epoch(EntityClass::Aircraft, 30, 9, bounds, epoch());
        let later = epoch() + chrono::Duration::hours(6);
        for track in fleet.tracks_at(later) {
            assert!(bounds.contains(&track.position), "{:?}", track.position);
        }
    }

    #[test]
    fn test_tracks_move_over_time() {
        let fleet = SyntheticFleet::with_epoch(EntityClass::Aircraft, 5, 3, north_sea(), epoch());
        let start = fleet.tracks_at(epoch());
        let later = fleet.tracks_at(epoch() + chrono::Duration::minutes(5));
        let moved = start
            .iter()
            .zip(&later)
            .filter(|(a, b)| a.position != b.position)
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn test_observe_respects_coverage() {
        let fleet = SyntheticFleet::with_epoch(EntityClass::Vessel, 100, 5, north_sea(), epoch());
        let full = fleet.observe(
            FleetView {
                source: SourceId::AisHub,
                coverage: 1.0,
            },
            epoch(),
        );
        assert_eq!(full.len(), 100);

        let none = fleet.observe(
            FleetView {
                source: SourceId::AisHub,
                coverage: 0.0,
            },
            epoch(),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_observation_noise_is_small() {
        let fleet = SyntheticFleet::with_epoch(EntityClass::Vessel, 10, 5, north_sea(), epoch());
        let truth = fleet.tracks_at(epoch());
        let seen = fleet.observe(
            FleetView {
                source: SourceId::MarineTraffic,
                coverage: 1.0,
            },
            epoch(),
        );
        for (t, s) in truth.iter().zip(&seen) {
            assert_eq!(t.identity, s.identity);
            assert!((t.position.latitude - s.position.latitude).abs() <= OBSERVATION_NOISE_DEG);
        }
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(55.0, 50.0, 60.0), 55.0);
        assert!((wrap(61.0, 50.0, 60.0) - 51.0).abs() < 1e-9);
        assert!((wrap(49.0, 50.0, 60.0) - 59.0).abs() < 1e-9);
        assert_eq!(wrap(10.0, 5.0, 5.0), 5.0);
    }
}
