//! Canonical position records shared by adapters, the orchestrator and fusion.
//!
//! Every provider payload is normalized into one of two shapes,
//! [`AircraftRecord`] or [`VesselRecord`], before anything else looks at it.
//! Both implement [`PositionReport`], which is the only view the collection
//! orchestrator and fusion engine have of a record.
//!
//! ```text
//! provider JSON ──► mapper ──► AircraftRecord / VesselRecord ──► fusion ──► FusedRecord<R>
//! ```

mod aircraft;
mod fused;
mod position;
mod source;
mod vessel;

pub use aircraft::{normalize_hex, AircraftRecord};
pub use fused::FusedRecord;
pub use position::{Bounds, Position};
pub use source::{EntityClass, SourceId, UnknownSource};
pub use vessel::{has_valid_mmsi, VesselRecord};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::fusion::FieldPicker;

/// A normalized position report from a single source.
pub trait PositionReport:
    Clone + fmt::Debug + PartialEq + Serialize + Send + Sync + 'static
{
    /// Entity class this record type describes.
    const CLASS: EntityClass;

    /// Primary matching key (ICAO hex or MMSI).
    fn identity(&self) -> &str;

    /// Optional fallback key (callsign or IMO).
    fn secondary_identity(&self) -> Option<&str>;

    fn position(&self) -> Position;

    /// Capture time reported by the source.
    fn timestamp(&self) -> DateTime<Utc>;

    fn source(&self) -> SourceId;

    /// Source confidence in [0, 1].
    fn data_quality(&self) -> f64;

    fn set_data_quality(&mut self, quality: f64);

    /// Whether the identity is usable as a fusion grouping key.
    ///
    /// Records failing this are still forwarded to the raw sink but never
    /// grouped or fused.
    fn has_fusable_identity(&self) -> bool {
        !self.identity().is_empty()
    }

    /// Build one record from ranked contributors, best first.
    ///
    /// Implementations take identity, position, timestamp and source from the
    /// leading record and every optional field through `picker`, which
    /// backfills from lower-ranked contributors and records provenance.
    fn merge_ranked(picker: &mut FieldPicker<'_, Self>) -> Self;
}
