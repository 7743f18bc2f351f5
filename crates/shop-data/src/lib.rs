//! HTTP client for the storefront REST API.
//!
//! Provides a small builder API over a pluggable [`Transport`] with
//! automatic JSON handling, per-endpoint timeouts and retries for reads.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_data::{Endpoint, FetchClient, ReqwestTransport};
//!
//! let transport = ReqwestTransport::new(std::time::Duration::from_secs(2))?;
//! let client = FetchClient::new(std::sync::Arc::new(transport))
//!     .with_base_url("https://api.example.com");
//!
//! let cart: serde_json::Value = client
//!     .get("/api/cart")
//!     .endpoint(Endpoint::Cart)
//!     .bearer_auth(token)
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod endpoint;
mod error;
mod request;
mod response;
mod retry;
mod timeout;
mod transport;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub use endpoint::Endpoint;
pub use error::FetchError;
pub use request::{Method, RequestBuilder};
pub use response::Response;
pub use retry::RetryPolicy;
pub use timeout::TimeoutConfig;
pub use transport::Transport;

#[cfg(not(target_arch = "wasm32"))]
pub use transport::ReqwestTransport;
#[cfg(target_arch = "wasm32")]
pub use transport::SpinTransport;
#[cfg(all(any(test, feature = "test-util"), not(target_arch = "wasm32")))]
pub use transport::{StubReply, StubTransport};

/// HTTP client for making outbound requests.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    transport: Arc<dyn Transport>,
    timeout: TimeoutConfig,
    read_retries: Option<u32>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("read_retries", &self.read_retries)
            .finish()
    }
}

impl FetchClient {
    /// Create a new HTTP client over a transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: None,
            default_headers: HashMap::new(),
            transport,
            timeout: TimeoutConfig::default(),
            read_retries: None,
        }
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set the client-wide timeout ceiling.
    pub fn with_timeout(mut self, timeout: TimeoutConfig) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry budget for safe (read) requests.
    pub fn with_read_retries(mut self, retries: u32) -> Self {
        self.read_retries = Some(retries);
        self
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    /// Create a PATCH request.
    pub fn patch(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Patch, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) => {
                if url.starts_with("http://") || url.starts_with("https://") {
                    url
                } else {
                    format!("{}{}", base.trim_end_matches('/'), url)
                }
            }
            None => url,
        };

        let mut builder = RequestBuilder::new(method, full_url).accept("application/json");
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        let retry = if method.is_safe() {
            RetryPolicy::reads(self.read_retries.unwrap_or(1))
        } else {
            RetryPolicy::none()
        };

        ClientRequestBuilder {
            builder,
            transport: Arc::clone(&self.transport),
            timeout: self.timeout.clone(),
            ceiling: self.timeout.total,
            retry,
            read_retries: self.read_retries,
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
    timeout: TimeoutConfig,
    ceiling: Duration,
    retry: RetryPolicy,
    read_retries: Option<u32>,
}

impl ClientRequestBuilder {
    /// Apply an endpoint's default timeout and retry budget.
    ///
    /// The client-wide timeout stays a ceiling, and unsafe methods are
    /// never retried regardless of the endpoint.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.timeout = TimeoutConfig::from_total(endpoint.default_timeout()).capped_at(self.ceiling);
        self.retry = if self.builder.method().is_safe() && !endpoint.is_mutation() {
            RetryPolicy::reads(
                self.read_retries
                    .unwrap_or_else(|| endpoint.default_max_retries()),
            )
        } else {
            RetryPolicy::none()
        };
        self
    }

    /// Override the retry policy (still ignored for unsafe methods).
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        if self.builder.method().is_safe() {
            self.retry = policy;
        }
        self
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl std::fmt::Display) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// The request as it will be sent.
    pub fn request(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Send the request and return the response.
    ///
    /// Non-2xx statuses are returned as `Ok`; call
    /// [`Response::error_for_status`] to turn them into errors.
    pub async fn send(self) -> Result<Response, FetchError> {
        let mut attempt = 0;
        loop {
            let result = self.send_once().await;

            if !self.retry.should_retry(&result, attempt) {
                return result;
            }

            let delay = self.retry.delay_for_attempt(attempt);
            attempt += 1;
            sleep(delay).await;
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn send_once(&self) -> Result<Response, FetchError> {
        match tokio::time::timeout(
            self.timeout.total,
            self.transport.send(self.builder.clone()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }

    // Spin enforces its own outbound timeouts.
    #[cfg(target_arch = "wasm32")]
    async fn send_once(&self) -> Result<Response, FetchError> {
        self.transport.send(self.builder.clone()).await
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(target_arch = "wasm32")]
async fn sleep(_delay: Duration) {}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Endpoint, FetchClient, FetchError, Method, Response, Transport};
}
