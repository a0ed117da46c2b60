//! Status report aggregated from adapter health and orchestrator state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adapter::{AdapterMode, CircuitState, HealthSnapshot, SourceAdapter};
use crate::orchestrator::ClassStatus;
use crate::record::{EntityClass, PositionReport, SourceId};
use crate::telemetry::TelemetrySnapshot;

/// Health of one registered source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStatus {
    pub source: SourceId,
    pub class: EntityClass,
    pub mode: AdapterMode,
    pub endpoint: String,
    #[serde(flatten)]
    pub health: HealthSnapshot,
}

impl SourceStatus {
    pub(crate) fn from_adapter<R: PositionReport>(adapter: &dyn SourceAdapter<R>) -> Self {
        Self {
            source: adapter.source(),
            class: R::CLASS,
            mode: adapter.mode(),
            endpoint: adapter.endpoint(),
            health: adapter.health(),
        }
    }

    /// Closed breaker and no failure on the latest call.
    pub fn is_healthy(&self) -> bool {
        self.health.circuit_state == CircuitState::Closed && self.health.consecutive_failures == 0
    }
}

/// Everything an operator needs to judge whether collection is working.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<SourceStatus>,
    pub aircraft: ClassStatus,
    pub vessel: ClassStatus,
    pub telemetry: TelemetrySnapshot,
}

impl StatusReport {
    pub fn source(&self, id: SourceId) -> Option<&SourceStatus> {
        self.sources.iter().find(|status| status.source == id)
    }

    pub fn class(&self, class: EntityClass) -> &ClassStatus {
        match class {
            EntityClass::Aircraft => &self.aircraft,
            EntityClass::Vessel => &self.vessel,
        }
    }

    pub fn healthy_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.is_healthy()).count()
    }

    /// Sources currently short-circuited by their breaker.
    pub fn open_circuits(&self) -> Vec<SourceId> {
        self.sources
            .iter()
            .filter(|s| s.health.circuit_state == CircuitState::Open)
            .map(|s| s.source)
            .collect()
    }
}
