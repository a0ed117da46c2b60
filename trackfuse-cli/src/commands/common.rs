//! Common types and utilities shared across CLI commands.

use std::path::Path;

use clap::ValueEnum;
use trackfuse::config::ConfigFile;
use trackfuse::log::{init_logging, LoggingGuard};
use trackfuse::record::EntityClass;

use crate::error::CliError;

/// Entity class selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ClassArg {
    /// Aircraft sources only
    Aircraft,
    /// Vessel sources only
    Vessel,
    /// Both classes
    All,
}

impl ClassArg {
    pub fn includes(&self, class: EntityClass) -> bool {
        match self {
            ClassArg::All => true,
            ClassArg::Aircraft => class == EntityClass::Aircraft,
            ClassArg::Vessel => class == EntityClass::Vessel,
        }
    }
}

/// Load configuration from `path`, or from the default location.
///
/// An explicit path must exist; the default location falls back to
/// built-in defaults when absent.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    match path {
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => Ok(ConfigFile::load()?),
    }
}

/// Start logging as configured.
pub fn start_logging(config: &ConfigFile) -> Result<LoggingGuard, CliError> {
    Ok(init_logging(
        &config.general.log_level,
        config.general.log_dir.as_deref(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_class_arg_includes() {
        assert!(ClassArg::All.includes(EntityClass::Aircraft));
        assert!(ClassArg::All.includes(EntityClass::Vessel));
        assert!(ClassArg::Aircraft.includes(EntityClass::Aircraft));
        assert!(!ClassArg::Aircraft.includes(EntityClass::Vessel));
        assert!(!ClassArg::Vessel.includes(EntityClass::Aircraft));
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general]\nlog_level = warn").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.general.log_level, "warn");
    }

    #[test]
    fn test_load_config_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("nope.ini")));
        assert!(matches!(result, Err(CliError::ConfigFile(_))));
    }
}
