//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show` and `config init`.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use trackfuse::config::{config_file_path, ConfigFile};

use super::common::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print the effective configuration (API keys masked)
    Show {
        /// Print API keys in clear text
        #[arg(long)]
        reveal: bool,
    },

    /// Write a configuration file with every default filled in
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand against `path`, or the default location.
pub fn run(command: ConfigCommands, path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(path),
        ConfigCommands::Show { reveal } => run_show(path, reveal),
        ConfigCommands::Init { force } => run_init(path, force),
    }
}

fn target(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf).unwrap_or_else(config_file_path)
}

/// Show the configuration file path.
fn run_path(path: Option<&Path>) -> Result<(), CliError> {
    let path = target(path);
    let marker = if path.exists() { "" } else { " (not created yet)" };
    println!("{}{}", path.display(), marker);
    Ok(())
}

/// Print the effective configuration.
fn run_show(path: Option<&Path>, reveal: bool) -> Result<(), CliError> {
    let config = load_config(path)?;
    print!("{}", config.to_ini_string(!reveal));
    Ok(())
}

/// Write a default configuration file.
fn run_init(path: Option<&Path>, force: bool) -> Result<(), CliError> {
    let path = target(path);
    write_default(&path, force)?;
    println!("Wrote default configuration to {}", path.display());
    println!("All sources start in simulated mode. Set simulated = false and");
    println!("api_key in a [source.<name>] section to poll the real provider.");
    Ok(())
}

fn write_default(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )));
    }
    ConfigFile::default().save_to(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_default_creates_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trackfuse").join("config.ini");

        write_default(&path, false).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, ConfigFile::default());
    }

    #[test]
    fn test_write_default_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[general]\nlog_level = debug\n").unwrap();

        assert!(matches!(
            write_default(&path, false),
            Err(CliError::Config(_))
        ));
        write_default(&path, true).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }
}
