//! CLI error types.

use thiserror::Error;
use trackfuse::config::ConfigError;
use trackfuse::log::LogError;
use trackfuse::service::ServiceError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error("Failed to start collection service: {0}")]
    Service(#[from] ServiceError),

    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] LogError),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to listen for Ctrl-C: {0}")]
    Signal(#[source] std::io::Error),
}
