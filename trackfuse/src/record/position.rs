//! WGS84 positions and geographic bounding boxes.

use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both coordinates are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Geographic bounding box used to request and filter position reports.
///
/// Boxes do not wrap the antimeridian: `min_lon` must not exceed `max_lon`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for Bounds {
    /// The whole globe.
    fn default() -> Self {
        Self::WORLD
    }
}

impl Bounds {
    pub const WORLD: Bounds = Bounds {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Check that the box is non-inverted and inside WGS84 ranges.
    pub fn validate(&self) -> Result<(), String> {
        let corners = [
            Position::new(self.min_lat, self.min_lon),
            Position::new(self.max_lat, self.max_lon),
        ];
        if corners.iter().any(|p| !p.is_valid()) {
            return Err(format!("bounds out of range: {:?}", self));
        }
        if self.min_lat > self.max_lat {
            return Err(format!(
                "min_lat {} exceeds max_lat {}",
                self.min_lat, self.max_lat
            ));
        }
        if self.min_lon > self.max_lon {
            return Err(format!(
                "min_lon {} exceeds max_lon {}",
                self.min_lon, self.max_lon
            ));
        }
        Ok(())
    }

    /// Inclusive containment test.
    pub fn contains(&self, position: &Position) -> bool {
        position.latitude >= self.min_lat
            && position.latitude <= self.max_lat
            && position.longitude >= self.min_lon
            && position.longitude <= self.max_lon
    }

    /// Centre of the box.
    pub fn center(&self) -> Position {
        Position::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}
