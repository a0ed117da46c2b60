//! Configuration file handling.
//!
//! Settings live in an INI file, by default `~/.trackfuse/config.ini`:
//!
//! ```ini
//! [general]
//! log_level = info
//! ; poll_interval_ms = 15000
//!
//! [bounds]
//! min_lat = 49.0
//! max_lat = 61.0
//! min_lon = -8.0
//! max_lon = 12.0
//!
//! [simulation]
//! seed = 2125262942
//! aircraft_fleet_size = 40
//! vessel_fleet_size = 60
//!
//! [source.opensky]
//! enabled = true
//! simulated = false
//! base_url = https://opensky-network.org/api
//! timeout_ms = 10000
//! poll_interval_ms = 10000
//! failure_threshold = 3
//! cooldown_ms = 60000
//! priority = 2
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

mod error;
mod source;

pub use error::ConfigError;
pub use source::{
    default_base_url, SourceConfig, DEFAULT_AIRCRAFT_POLL_INTERVAL, DEFAULT_SIMULATED_COVERAGE,
    DEFAULT_TIMEOUT, DEFAULT_VESSEL_POLL_INTERVAL,
};

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use tracing::warn;

use crate::adapter::simulation::{
    DEFAULT_AIRCRAFT_FLEET_SIZE, DEFAULT_SEED, DEFAULT_VESSEL_FLEET_SIZE,
};
use crate::record::{Bounds, EntityClass, SourceId};

const SOURCE_SECTION_PREFIX: &str = "source.";

/// Default log filter level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Location of the configuration file: `~/.trackfuse/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// Directory holding the configuration file and default logs.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".trackfuse")
}

/// `[general]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralSettings {
    /// Cycle interval for the driver. When unset, each class polls at the
    /// shortest interval among its enabled sources.
    pub poll_interval: Option<Duration>,
    pub log_level: String,
    /// Directory for daily log files. Console only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            poll_interval: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
        }
    }
}

/// `[simulation]` settings shared by all simulated adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSettings {
    pub seed: u64,
    pub aircraft_fleet_size: usize,
    pub vessel_fleet_size: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            aircraft_fleet_size: DEFAULT_AIRCRAFT_FLEET_SIZE,
            vessel_fleet_size: DEFAULT_VESSEL_FLEET_SIZE,
        }
    }
}

/// The complete configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub general: GeneralSettings,
    pub bounds: Bounds,
    pub simulation: SimulationSettings,
    sources: BTreeMap<SourceId, SourceConfig>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            bounds: Bounds::default(),
            simulation: SimulationSettings::default(),
            sources: SourceId::ALL
                .iter()
                .map(|&id| (id, SourceConfig::defaults(id)))
                .collect(),
        }
    }
}

impl ConfigFile {
    /// Load from [`config_file_path`]. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini_str(&text)
    }

    /// Parse and validate INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        for (section, properties) in ini.iter() {
            let Some(section) = section else {
                continue;
            };
            for (key, value) in properties.iter() {
                config.apply(section, key, value.trim())?;
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        match section {
            "general" => match key {
                "poll_interval_ms" => {
                    self.general.poll_interval = Some(parse_millis(section, key, value)?)
                }
                "log_level" => self.general.log_level = value.to_string(),
                "log_dir" => {
                    self.general.log_dir = (!value.is_empty()).then(|| expand_home(value))
                }
                _ => warn_unknown(section, key),
            },
            "bounds" => {
                let degrees: f64 = parse_value(section, key, value)?;
                match key {
                    "min_lat" => self.bounds.min_lat = degrees,
                    "max_lat" => self.bounds.max_lat = degrees,
                    "min_lon" => self.bounds.min_lon = degrees,
                    "max_lon" => self.bounds.max_lon = degrees,
                    _ => warn_unknown(section, key),
                }
            }
            "simulation" => match key {
                "seed" => self.simulation.seed = parse_value(section, key, value)?,
                "aircraft_fleet_size" => {
                    self.simulation.aircraft_fleet_size = parse_value(section, key, value)?
                }
                "vessel_fleet_size" => {
                    self.simulation.vessel_fleet_size = parse_value(section, key, value)?
                }
                _ => warn_unknown(section, key),
            },
            _ => match section.strip_prefix(SOURCE_SECTION_PREFIX) {
                Some(name) => {
                    let id = name
                        .parse::<SourceId>()
                        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                    apply_source(self.source_mut(id), section, key, value)?;
                }
                None => warn_unknown(section, key),
            },
        }
        Ok(())
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds.validate().map_err(ConfigError::Invalid)?;
        if self.general.poll_interval.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::Invalid(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        for source in self.sources.values() {
            source.validate().map_err(ConfigError::Invalid)?;
        }
        Ok(())
    }

    /// Settings for one source.
    pub fn source(&self, id: SourceId) -> SourceConfig {
        self.sources
            .get(&id)
            .cloned()
            .unwrap_or_else(|| SourceConfig::defaults(id))
    }

    pub fn source_mut(&mut self, id: SourceId) -> &mut SourceConfig {
        self.sources
            .entry(id)
            .or_insert_with(|| SourceConfig::defaults(id))
    }

    /// All sources in declaration order.
    pub fn sources(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.values()
    }

    pub fn enabled_sources(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.values().filter(|source| source.enabled)
    }

    /// Fusion tie-break priority per source.
    pub fn priorities(&self) -> HashMap<SourceId, u32> {
        self.sources
            .values()
            .map(|source| (source.source, source.priority))
            .collect()
    }

    /// Cycle interval for `class`.
    pub fn poll_interval(&self, class: EntityClass) -> Duration {
        if let Some(interval) = self.general.poll_interval {
            return interval;
        }
        self.enabled_sources()
            .filter(|source| source.source.class() == class)
            .map(|source| source.poll_interval)
            .min()
            .unwrap_or(match class {
                EntityClass::Aircraft => DEFAULT_AIRCRAFT_POLL_INTERVAL,
                EntityClass::Vessel => DEFAULT_VESSEL_POLL_INTERVAL,
            })
    }

    /// Render as INI. API keys are replaced by `********` when `redact`.
    pub fn to_ini(&self, redact: bool) -> Ini {
        let mut ini = Ini::new();

        {
            let mut general = ini.with_section(Some("general"));
            general.set("log_level", self.general.log_level.as_str());
            if let Some(interval) = self.general.poll_interval {
                general.set("poll_interval_ms", interval.as_millis().to_string());
            }
            if let Some(dir) = &self.general.log_dir {
                general.set("log_dir", dir.display().to_string());
            }
        }

        ini.with_section(Some("bounds"))
            .set("min_lat", self.bounds.min_lat.to_string())
            .set("max_lat", self.bounds.max_lat.to_string())
            .set("min_lon", self.bounds.min_lon.to_string())
            .set("max_lon", self.bounds.max_lon.to_string());

        ini.with_section(Some("simulation"))
            .set("seed", self.simulation.seed.to_string())
            .set(
                "aircraft_fleet_size",
                self.simulation.aircraft_fleet_size.to_string(),
            )
            .set(
                "vessel_fleet_size",
                self.simulation.vessel_fleet_size.to_string(),
            );

        for source in self.sources.values() {
            let name = format!("{}{}", SOURCE_SECTION_PREFIX, source.source);
            let mut section = ini.with_section(Some(name));
            section
                .set("enabled", source.enabled.to_string())
                .set("simulated", source.simulated.to_string())
                .set("base_url", source.base_url.as_str())
                .set("timeout_ms", source.timeout.as_millis().to_string())
                .set("poll_interval_ms", source.poll_interval.as_millis().to_string())
                .set("failure_threshold", source.failure_threshold.to_string())
                .set("cooldown_ms", source.cooldown.as_millis().to_string())
                .set("priority", source.priority.to_string())
                .set("simulated_coverage", source.simulated_coverage.to_string())
                .set(
                    "simulated_failure_rate",
                    source.simulated_failure_rate.to_string(),
                );
            if let Some(key) = &source.api_key {
                section.set("api_key", if redact { "********" } else { key.as_str() });
            }
        }

        ini
    }

    /// Render as INI text.
    pub fn to_ini_string(&self, redact: bool) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.to_ini(redact).write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Save to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        self.to_ini(false).write_to_file(path).map_err(io_error)
    }
}

fn apply_source(
    source: &mut SourceConfig,
    section: &str,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match key {
        "enabled" => source.enabled = parse_bool(section, key, value)?,
        "simulated" => source.simulated = parse_bool(section, key, value)?,
        "base_url" => source.base_url = value.to_string(),
        "api_key" => source.api_key = (!value.is_empty()).then(|| value.to_string()),
        "timeout_ms" => source.timeout = parse_millis(section, key, value)?,
        "poll_interval_ms" => source.poll_interval = parse_millis(section, key, value)?,
        "failure_threshold" => source.failure_threshold = parse_value(section, key, value)?,
        "cooldown_ms" => source.cooldown = parse_millis(section, key, value)?,
        "priority" => source.priority = parse_value(section, key, value)?,
        "simulated_coverage" => source.simulated_coverage = parse_value(section, key, value)?,
        "simulated_failure_rate" => {
            source.simulated_failure_rate = parse_value(section, key, value)?
        }
        _ => warn_unknown(section, key),
    }
    Ok(())
}

fn parse_value<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid_value(section, key, value, e.to_string()))
}

fn parse_millis(section: &str, key: &str, value: &str) -> Result<Duration, ConfigError> {
    parse_value::<u64>(section, key, value).map(Duration::from_millis)
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::invalid_value(
            section,
            key,
            value,
            "expected true or false",
        )),
    }
}

fn expand_home(value: &str) -> PathBuf {
    match value.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(value)),
        None => PathBuf::from(value),
    }
}

fn warn_unknown(section: &str, key: &str) {
    warn!(section, key, "Ignoring unknown configuration key");
}
