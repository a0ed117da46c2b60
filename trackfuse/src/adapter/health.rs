//! Per-adapter health counters and circuit breaker.
//!
//! Each adapter owns one [`AdapterHealthState`]. Only that adapter's fetch
//! task updates it; the status interface reads point-in-time
//! [`HealthSnapshot`]s.
//!
//! # State Machine
//!
//! ```text
//! Closed   --[consecutive_failures >= failure_threshold]--> Open
//! Open     --[cooldown elapsed, next admission]-----------> HalfOpen
//! HalfOpen --[trial succeeds]-----------------------------> Closed
//! HalfOpen --[trial fails]--------------------------------> Open (cooldown restarts)
//! ```
//!
//! While open, [`AdapterHealthState::admit`] short-circuits and the adapter
//! returns an empty result without touching the network.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Default consecutive failures before the circuit opens.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default time the circuit stays open before a trial call.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Configuration for an adapter's circuit breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before allowing a trial call.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls go through (normal operation).
    Closed,
    /// Calls are short-circuited until the cooldown elapses.
    Open,
    /// Cooldown elapsed; the next call is a trial.
    HalfOpen,
}

impl CircuitState {
    /// Operator-facing label.
    pub fn display_status(&self) -> &'static str {
        match self {
            CircuitState::Closed => "healthy",
            CircuitState::Open => "suspended",
            CircuitState::HalfOpen => "probing",
        }
    }
}

/// Outcome of asking the breaker whether a call may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Proceed,
    ShortCircuit { retry_in: Duration },
}

#[derive(Debug)]
struct HealthInner {
    state: CircuitState,
    opened_at: Option<Instant>,
    total_requests: u64,
    successes: u64,
    failures: u64,
    consecutive_failures: u32,
    short_circuited: u64,
    last_success: Option<DateTime<Utc>>,
    last_error_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    last_record_count: usize,
    last_latency: Option<Duration>,
}

impl HealthInner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            opened_at: None,
            total_requests: 0,
            successes: 0,
            failures: 0,
            consecutive_failures: 0,
            short_circuited: 0,
            last_success: None,
            last_error_at: None,
            last_error: None,
            last_record_count: 0,
            last_latency: None,
        }
    }

    fn open(&mut self) {
        self.state = CircuitState::Open;
        self.opened_at = Some(Instant::now());
    }
}

/// Rolling health counters plus circuit breaker for one adapter.
#[derive(Debug)]
pub struct AdapterHealthState {
    config: CircuitBreakerConfig,
    inner: Mutex<HealthInner>,
}

impl AdapterHealthState {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(HealthInner::new()),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Decide whether the next call may reach the network.
    ///
    /// Moves an open circuit to half-open once the cooldown has elapsed.
    pub fn admit(&self) -> Admission {
        let mut inner = self.inner.lock();

        if inner.state == CircuitState::Open {
            let elapsed = inner
                .opened_at
                .map(|at| at.elapsed())
                .unwrap_or(self.config.cooldown);
            if elapsed >= self.config.cooldown {
                inner.state = CircuitState::HalfOpen;
                tracing::info!("Circuit breaker half-open, allowing trial request");
            } else {
                inner.short_circuited += 1;
                return Admission::ShortCircuit {
                    retry_in: self.config.cooldown - elapsed,
                };
            }
        }

        inner.total_requests += 1;
        Admission::Proceed
    }

    /// Record a completed call that produced `records` usable records.
    pub fn record_success(&self, records: usize, latency: Duration) {
        let mut inner = self.inner.lock();
        if inner.state != CircuitState::Closed {
            tracing::info!("Circuit breaker CLOSED, source recovered");
        }
        inner.state = CircuitState::Closed;
        inner.opened_at = None;
        inner.successes += 1;
        inner.consecutive_failures = 0;
        inner.last_success = Some(Utc::now());
        inner.last_record_count = records;
        inner.last_latency = Some(latency);
    }

    /// Record a failed call and trip the circuit if warranted.
    pub fn record_failure(&self, error: &str, latency: Duration) {
        let mut inner = self.inner.lock();
        inner.failures += 1;
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        inner.last_error_at = Some(Utc::now());
        inner.last_error = Some(error.to_string());
        inner.last_record_count = 0;
        inner.last_latency = Some(latency);

        let state = inner.state;
        match state {
            CircuitState::HalfOpen => {
                inner.open();
                tracing::warn!(
                    cooldown_ms = self.config.cooldown.as_millis() as u64,
                    "Circuit breaker trial failed, re-opening"
                );
            }
            CircuitState::Closed
                if inner.consecutive_failures >= self.config.failure_threshold =>
            {
                inner.open();
                tracing::warn!(
                    consecutive_failures = inner.consecutive_failures,
                    cooldown_ms = self.config.cooldown.as_millis() as u64,
                    "Circuit breaker OPENED"
                );
            }
            _ => {}
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().state == CircuitState::Open
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> HealthSnapshot {
        let inner = self.inner.lock();
        let completed = inner.successes + inner.failures;
        let cooldown_remaining = match (inner.state, inner.opened_at) {
            (CircuitState::Open, Some(at)) => {
                Some(self.config.cooldown.saturating_sub(at.elapsed()))
            }
            _ => None,
        };

        HealthSnapshot {
            circuit_state: inner.state,
            total_requests: inner.total_requests,
            successes: inner.successes,
            failures: inner.failures,
            consecutive_failures: inner.consecutive_failures,
            short_circuited: inner.short_circuited,
            success_rate: (completed > 0).then(|| inner.successes as f64 / completed as f64),
            last_success: inner.last_success,
            last_error_at: inner.last_error_at,
            last_error: inner.last_error.clone(),
            last_record_count: inner.last_record_count,
            last_latency_ms: inner.last_latency.map(|d| d.as_millis() as u64),
            cooldown_remaining_ms: cooldown_remaining.map(|d| d.as_millis() as u64),
        }
    }
}

impl Default for AdapterHealthState {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

/// Read-only view of an adapter's health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    pub circuit_state: CircuitState,
    /// Calls that were allowed to reach the network.
    pub total_requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub consecutive_failures: u32,
    /// Calls skipped because the circuit was open.
    pub short_circuited: u64,
    /// Successes over completed calls; `None` before the first call.
    pub success_rate: Option<f64>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_record_count: usize,
    pub last_latency_ms: Option<u64>,
    pub cooldown_remaining_ms: Option<u64>,
}
