//! Per-source adapter settings.

use std::time::Duration;

use crate::adapter::CircuitBreakerConfig;
use crate::record::{EntityClass, SourceId};

/// Default request timeout for provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default poll interval for aircraft sources (fast-moving traffic).
pub const DEFAULT_AIRCRAFT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default poll interval for vessel sources.
pub const DEFAULT_VESSEL_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default share of the synthetic fleet each simulated source reports.
pub const DEFAULT_SIMULATED_COVERAGE: f64 = 0.8;

/// Settings for one source adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub source: SourceId,
    /// Disabled sources are not registered with the orchestrator.
    pub enabled: bool,
    /// Generate synthetic payloads instead of calling the provider.
    pub simulated: bool,
    pub base_url: String,
    /// API key, token or username, depending on the provider.
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub failure_threshold: u32,
    pub cooldown: Duration,
    /// Fusion tie-break priority. Lower wins.
    pub priority: u32,
    /// Share of the synthetic fleet this source sees in simulated mode.
    pub simulated_coverage: f64,
    /// Probability that a simulated fetch fails.
    pub simulated_failure_rate: f64,
}

impl SourceConfig {
    /// Defaults for `source`.
    pub fn defaults(source: SourceId) -> Self {
        let breaker = CircuitBreakerConfig::default();
        Self {
            source,
            enabled: true,
            simulated: true,
            base_url: default_base_url(source).to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: match source.class() {
                EntityClass::Aircraft => DEFAULT_AIRCRAFT_POLL_INTERVAL,
                EntityClass::Vessel => DEFAULT_VESSEL_POLL_INTERVAL,
            },
            failure_threshold: breaker.failure_threshold,
            cooldown: breaker.cooldown,
            priority: source.default_priority(),
            simulated_coverage: DEFAULT_SIMULATED_COVERAGE,
            simulated_failure_rate: 0.0,
        }
    }

    /// Circuit breaker settings derived from this config.
    pub fn circuit_breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            cooldown: self.cooldown,
        }
    }

    /// Check values that would make the adapter misbehave.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout.is_zero() {
            return Err(format!("{}: timeout must be greater than zero", self.source));
        }
        if self.poll_interval.is_zero() {
            return Err(format!(
                "{}: poll interval must be greater than zero",
                self.source
            ));
        }
        if self.failure_threshold == 0 {
            return Err(format!(
                "{}: failure threshold must be at least 1",
                self.source
            ));
        }
        if !(0.0..=1.0).contains(&self.simulated_coverage) {
            return Err(format!(
                "{}: simulated coverage must be within [0, 1]",
                self.source
            ));
        }
        if !(0.0..=1.0).contains(&self.simulated_failure_rate) {
            return Err(format!(
                "{}: simulated failure rate must be within [0, 1]",
                self.source
            ));
        }
        if !self.simulated && self.base_url.trim().is_empty() {
            return Err(format!("{}: base_url is required in live mode", self.source));
        }
        Ok(())
    }
}

/// Provider base URL used when the config file does not set one.
pub fn default_base_url(source: SourceId) -> &'static str {
    match source {
        SourceId::AdsbExchange => "https://adsbexchange-com1.p.rapidapi.com/v2",
        SourceId::OpenSky => "https://opensky-network.org/api",
        SourceId::MarineTraffic => "https://services.marinetraffic.com/api/exportvessels/v:8",
        SourceId::VesselFinder => "https://api.vesselfinder.com",
        SourceId::AisHub => "https://data.aishub.net/ws.php",
        SourceId::MyShipTracking => "https://api.myshiptracking.com/api/v2",
    }
}
