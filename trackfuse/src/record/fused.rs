//! Fused output record.

use serde::{Deserialize, Serialize};

use super::{PositionReport, SourceId};

/// One record per distinct physical entity for a fetch cycle.
///
/// `record` holds the merged field set: identity, position, timestamp and
/// source come from the best-ranked contributor, optional fields are
/// backfilled from lower-ranked ones. `data_quality` is the maximum quality
/// of the contributors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedRecord<R> {
    pub identity: String,
    pub record: R,
    pub data_quality: f64,
    /// Sources that supplied at least one emitted field, best first.
    pub contributing_sources: Vec<SourceId>,
    /// Number of source records in the group, including ones that
    /// contributed nothing.
    pub group_size: usize,
}

impl<R: PositionReport> FusedRecord<R> {
    /// Wrap a single record without merging.
    pub fn single(record: R) -> Self {
        Self {
            identity: record.identity().to_string(),
            data_quality: record.data_quality(),
            contributing_sources: vec![record.source()],
            group_size: 1,
            record,
        }
    }

    /// The source whose record won the ranking.
    pub fn primary_source(&self) -> SourceId {
        self.record.source()
    }
}
