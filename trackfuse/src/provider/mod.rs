//! External data provider transport.
//!
//! Source adapters reach their providers through [`AsyncHttpClient`], so tests
//! can substitute a mock and count calls.
//!
//! ```ignore
//! use trackfuse::provider::{AsyncHttpClient, AsyncReqwestClient, HttpRequest};
//!
//! let client = AsyncReqwestClient::new()?;
//! let body = client
//!     .get(&HttpRequest::get("https://example.com/feed", Duration::from_secs(5)))
//!     .await?;
//! ```

mod http;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpRequest};
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
