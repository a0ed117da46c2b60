//! Orchestrator result and status types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adapter::FetchOutcome;
use crate::record::{EntityClass, SourceId};

/// One adapter's contribution to a cycle.
#[derive(Debug, Clone)]
pub struct SourceResult<R> {
    pub source: SourceId,
    pub endpoint: String,
    pub outcome: FetchOutcome<R>,
}

/// Summary of the most recent cycles of one entity class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStatus {
    pub class: EntityClass,
    pub cycles: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_cycle_ms: Option<u64>,
    pub sources_attempted: usize,
    pub sources_with_data: usize,
    /// Sources whose last fetch ended in an error, short-circuits included.
    pub sources_failed: usize,
    pub last_collected: usize,
    pub last_fused: usize,
    /// Cycles in a row where every source returned nothing.
    pub consecutive_empty_cycles: u32,
    /// The last cycle produced no records from any source.
    pub all_sources_empty: bool,
}

impl ClassStatus {
    pub fn new(class: EntityClass) -> Self {
        Self {
            class,
            cycles: 0,
            last_cycle_at: None,
            last_cycle_ms: None,
            sources_attempted: 0,
            sources_with_data: 0,
            sources_failed: 0,
            last_collected: 0,
            last_fused: 0,
            consecutive_empty_cycles: 0,
            all_sources_empty: false,
        }
    }

    /// Fold a finished collection into the status.
    pub(crate) fn record_cycle<R>(&mut self, results: &[SourceResult<R>], elapsed_ms: u64) {
        let collected: usize = results.iter().map(|r| r.outcome.records.len()).sum();

        self.cycles += 1;
        self.last_cycle_at = Some(Utc::now());
        self.last_cycle_ms = Some(elapsed_ms);
        self.sources_attempted = results.len();
        self.sources_with_data = results.iter().filter(|r| !r.outcome.is_empty()).count();
        self.sources_failed = results.iter().filter(|r| r.outcome.error.is_some()).count();
        self.last_collected = collected;
        self.last_fused = 0;
        self.all_sources_empty = collected == 0;
        if self.all_sources_empty {
            self.consecutive_empty_cycles = self.consecutive_empty_cycles.saturating_add(1);
        } else {
            self.consecutive_empty_cycles = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterError;
    use std::time::Duration;

    fn result(source: SourceId, records: Vec<u8>, error: Option<AdapterError>) -> SourceResult<u8> {
        let outcome = match error {
            Some(error) => FetchOutcome::failed(error, Duration::ZERO),
            None => FetchOutcome::ok(records, Duration::ZERO),
        };
        SourceResult {
            source,
            endpoint: String::new(),
            outcome,
        }
    }

    #[test]
    fn test_record_cycle_counts_sources() {
        let mut status = ClassStatus::new(EntityClass::Aircraft);
        status.record_cycle(
            &[
                result(SourceId::AdsbExchange, vec![1, 2, 3], None),
                result(SourceId::OpenSky, vec![], Some(AdapterError::Simulated)),
            ],
            40,
        );

        assert_eq!(status.cycles, 1);
        assert_eq!(status.sources_attempted, 2);
        assert_eq!(status.sources_with_data, 1);
        assert_eq!(status.sources_failed, 1);
        assert_eq!(status.last_collected, 3);
        assert_eq!(status.last_cycle_ms, Some(40));
        assert!(!status.all_sources_empty);
    }

    #[test]
    fn test_consecutive_empty_cycles_reset() {
        let mut status = ClassStatus::new(EntityClass::Vessel);
        let empty = [result(SourceId::AisHub, vec![], None)];
        status.record_cycle(&empty, 1);
        status.record_cycle(&empty, 1);
        assert!(status.all_sources_empty);
        assert_eq!(status.consecutive_empty_cycles, 2);

        status.record_cycle(&[result(SourceId::AisHub, vec![9], None)], 1);
        assert!(!status.all_sources_empty);
        assert_eq!(status.consecutive_empty_cycles, 0);
    }
}
