//! Service error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::provider::ProviderError;

/// Errors raised while assembling the collection service.
///
/// Once built, the service itself never fails: collection problems show up
/// as empty results and in the status report.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] ProviderError),
}
