//! Logging setup.
//!
//! Console output always; a daily-rolled file under `log_dir` when one is
//! configured. `RUST_LOG` overrides the configured level.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// File name prefix of the rolled log files.
pub const LOG_FILE_NAME: &str = "trackfuse.log";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Keeps the background log writer alive. Drop it on shutdown to flush.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Default filter directive for `level`, covering the library and the CLI.
pub fn default_filter(level: &str) -> String {
    format!("trackfuse={level},trackfuse_cli={level}")
}

/// Install the global subscriber.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<LoggingGuard, LogError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let console = fmt::layer()
        .with_timer(LocalTime::rfc_3339())
        .with_target(false);

    let (file, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LogError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(LocalTime::rfc_3339())
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| LogError::Init(e.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter("debug"), "trackfuse=debug,trackfuse_cli=debug");
    }

    #[test]
    fn test_log_dir_must_be_creatable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = init_logging("info", Some(&blocker.join("logs"))).err().unwrap();
        assert!(matches!(err, LogError::CreateDir { .. }));
    }
}
