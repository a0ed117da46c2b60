//! Identity-grouped, quality-weighted fusion.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use super::merge::FieldPicker;
use crate::record::{FusedRecord, PositionReport, SourceId};

/// Counters describing one fusion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FusionStats {
    /// Records handed to the engine.
    pub input: usize,
    /// Dropped for a null or out-of-range position.
    pub invalid_position: usize,
    /// Dropped for an identity that cannot key a group (e.g. bad MMSI).
    pub unfusable_identity: usize,
    /// Dropped for a malformed quality value.
    pub malformed: usize,
    /// Older same-source duplicates superseded within a group.
    pub superseded: usize,
    /// Distinct identities emitted.
    pub groups: usize,
    /// Groups built from more than one source.
    pub merged_groups: usize,
}

impl FusionStats {
    /// Records removed before grouping.
    pub fn dropped(&self) -> usize {
        self.invalid_position + self.unfusable_identity + self.malformed
    }
}

/// Result of a fusion pass.
#[derive(Debug, Clone)]
pub struct FusionOutput<R> {
    pub fused: Vec<FusedRecord<R>>,
    pub stats: FusionStats,
}

/// Merges same-identity records from multiple sources into one record each.
///
/// # Ranking
///
/// Within an identity group contributors are ordered by:
///
/// 1. `data_quality`, highest first
/// 2. source priority, lowest number first
/// 3. `SourceId` declaration order
/// 4. timestamp, newest first
///
/// The order is total, so the output does not depend on input order.
///
/// # Failure semantics
///
/// The engine never fails. Invalid records are skipped with a warning and
/// counted in [`FusionStats`].
#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    priorities: HashMap<SourceId, u32>,
}

impl FusionEngine {
    /// Create an engine using each source's default priority.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with per-source priority overrides.
    pub fn with_priorities(priorities: HashMap<SourceId, u32>) -> Self {
        Self { priorities }
    }

    /// Effective tie-break priority for `source`. Lower wins.
    pub fn priority(&self, source: SourceId) -> u32 {
        self.priorities
            .get(&source)
            .copied()
            .unwrap_or_else(|| source.default_priority())
    }

    /// Merge `records` into one fused record per identity.
    pub fn merge<R: PositionReport>(&self, records: Vec<R>) -> Vec<FusedRecord<R>> {
        self.merge_with_stats(records).fused
    }

    /// Merge `records` and report what was dropped along the way.
    pub fn merge_with_stats<R: PositionReport>(&self, records: Vec<R>) -> FusionOutput<R> {
        let mut stats = FusionStats {
            input: records.len(),
            ..Default::default()
        };

        let mut groups: BTreeMap<String, Vec<R>> = BTreeMap::new();
        for record in records {
            if !Self::admit(&record, &mut stats) {
                continue;
            }
            groups
                .entry(record.identity().to_string())
                .or_default()
                .push(record);
        }

        let mut fused = Vec::with_capacity(groups.len());
        for (identity, group) in groups {
            let group = Self::latest_per_source(group, &mut stats);
            if let Some(record) = self.fuse_group(identity, group) {
                if record.contributing_sources.len() > 1 {
                    stats.merged_groups += 1;
                }
                fused.push(record);
            }
        }
        stats.groups = fused.len();

        debug!(
            input = stats.input,
            fused = stats.groups,
            merged = stats.merged_groups,
            dropped = stats.dropped(),
            "Fusion pass complete"
        );

        FusionOutput { fused, stats }
    }

    /// Decide whether a record may enter grouping.
    fn admit<R: PositionReport>(record: &R, stats: &mut FusionStats) -> bool {
        let quality = record.data_quality();
        if !quality.is_finite() || !(0.0..=1.0).contains(&quality) {
            warn!(
                source = %record.source(),
                identity = record.identity(),
                quality,
                "Skipping record with malformed quality"
            );
            stats.malformed += 1;
            return false;
        }

        if !record.position().is_valid() {
            warn!(
                source = %record.source(),
                identity = record.identity(),
                position = ?record.position(),
                "Skipping record with invalid position"
            );
            stats.invalid_position += 1;
            return false;
        }

        if !record.has_fusable_identity() {
            debug!(
                source = %record.source(),
                identity = record.identity(),
                "Excluding record with unfusable identity"
            );
            stats.unfusable_identity += 1;
            return false;
        }

        true
    }

    /// Keep only the newest record from each source in a group.
    fn latest_per_source<R: PositionReport>(group: Vec<R>, stats: &mut FusionStats) -> Vec<R> {
        let before = group.len();
        let mut latest: BTreeMap<SourceId, R> = BTreeMap::new();
        for record in group {
            match latest.get(&record.source()) {
                Some(existing) if Self::newer(existing, &record) != Ordering::Less => {}
                _ => {
                    latest.insert(record.source(), record);
                }
            }
        }
        stats.superseded += before - latest.len();
        latest.into_values().collect()
    }

    /// Order two same-source records by recency, then quality, then position.
    ///
    /// Full ties fall back to the serialized record, so the survivor never
    /// depends on arrival order.
    fn newer<R: PositionReport>(a: &R, b: &R) -> Ordering {
        a.timestamp()
            .cmp(&b.timestamp())
            .then_with(|| a.data_quality().total_cmp(&b.data_quality()))
            .then_with(|| a.position().latitude.total_cmp(&b.position().latitude))
            .then_with(|| a.position().longitude.total_cmp(&b.position().longitude))
            .then_with(|| canonical(a).cmp(&canonical(b)))
    }

    /// Ranking comparator: best contributor sorts first.
    fn rank<R: PositionReport>(&self, a: &R, b: &R) -> Ordering {
        b.data_quality()
            .total_cmp(&a.data_quality())
            .then_with(|| self.priority(a.source()).cmp(&self.priority(b.source())))
            .then_with(|| a.source().cmp(&b.source()))
            .then_with(|| b.timestamp().cmp(&a.timestamp()))
    }

    fn fuse_group<R: PositionReport>(
        &self,
        identity: String,
        group: Vec<R>,
    ) -> Option<FusedRecord<R>> {
        if group.len() == 1 {
            return group.into_iter().next().map(FusedRecord::single);
        }

        let mut ranked: Vec<&R> = group.iter().collect();
        ranked.sort_by(|a, b| self.rank(*a, *b));

        let mut picker = FieldPicker::new(&ranked)?;
        let record = R::merge_ranked(&mut picker);
        let data_quality = picker.max_quality();
        let contributing_sources = picker.contributors();

        Some(FusedRecord {
            identity,
            record,
            data_quality,
            contributing_sources,
            group_size: group.len(),
        })
    }
}

/// Stable textual form of a record. Object keys serialize in sorted order.
fn canonical<R: PositionReport>(record: &R) -> String {
    serde_json::to_string(record).unwrap_or_default()
}
