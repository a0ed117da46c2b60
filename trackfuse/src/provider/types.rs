//! Provider transport error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to an external data provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Connection, TLS or body read failure.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Provider answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Request did not complete within the adapter timeout.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl ProviderError {
    /// True for 5xx responses and timeouts, which are worth retrying next cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::HttpError(_) | ProviderError::Timeout(_) => true,
            ProviderError::Status { status, .. } => *status >= 500 || *status == 429,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ProviderError::Status {
            status: 503,
            url: "https://example.com/feed".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from https://example.com/feed");

        let err = ProviderError::Timeout(Duration::from_millis(2000));
        assert_eq!(err.to_string(), "request timed out after 2000ms");
    }

    #[test]
    fn test_is_transient() {
        assert!(ProviderError::HttpError("reset".into()).is_transient());
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(ProviderError::Status {
            status: 502,
            url: String::new()
        }
        .is_transient());
        assert!(ProviderError::Status {
            status: 429,
            url: String::new()
        }
        .is_transient());
        assert!(!ProviderError::Status {
            status: 401,
            url: String::new()
        }
        .is_transient());
    }
}
