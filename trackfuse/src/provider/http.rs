//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use super::types::ProviderError;

/// A single GET request to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout,
        }
    }

    /// Add a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync + 'static {
    /// Performs an HTTP GET request.
    ///
    /// # Returns
    ///
    /// The response body as bytes, or an error for transport failures,
    /// timeouts and non-2xx statuses.
    fn get(&self, request: &HttpRequest)
        -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client with default configuration.
    ///
    /// Per-request timeouts come from [`HttpRequest::timeout`].
    pub fn new() -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("trackfuse/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

// The trait uses `impl Future<>` so the future is provably `Send` for
// spawning, which Clippy would otherwise rewrite as `async fn`.
#[allow(clippy::manual_async_fn)]
impl AsyncHttpClient for AsyncReqwestClient {
    fn get(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send {
        let mut builder = self.client.get(&request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let url = request.url.clone();
        let timeout = request.timeout;

        async move {
            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(timeout)
                } else {
                    ProviderError::HttpError(format!("Request failed: {}", e))
                }
            })?;

            // Check HTTP status
            if !response.status().is_success() {
                return Err(ProviderError::Status {
                    status: response.status().as_u16(),
                    url,
                });
            }

            // Read response body
            response.bytes().await.map(|b| b.to_vec()).map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(timeout)
                } else {
                    ProviderError::HttpError(format!("Failed to read response: {}", e))
                }
            })
        }
    }
}
