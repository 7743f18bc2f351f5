//! Transports that put a built request on the wire.

use async_trait::async_trait;

use crate::{FetchError, RequestBuilder, Response};

/// Sends a fully built request and returns the raw response.
///
/// Implementations must not interpret status codes; that is the client's job.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Transport: Send + Sync {
    /// Send the request.
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError>;
}

/// Native transport over `reqwest`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReqwestTransport {
    /// Create a transport with the given connect timeout.
    pub fn new(connect_timeout: std::time::Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| FetchError::RequestError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let mut builder = self
            .client
            .request(request.method.to_http(), request.url.as_str());

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(Response::new(status, headers, body))
    }
}

/// Spin outbound-HTTP transport for wasm32 components.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct SpinTransport;

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl Transport for SpinTransport {
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        use spin_sdk::http::{Method as SpinMethod, Request};

        let method = match request.method {
            crate::Method::Get => SpinMethod::Get,
            crate::Method::Post => SpinMethod::Post,
            crate::Method::Put => SpinMethod::Put,
            crate::Method::Patch => SpinMethod::Patch,
            crate::Method::Delete => SpinMethod::Delete,
            crate::Method::Head => SpinMethod::Head,
            crate::Method::Options => SpinMethod::Options,
        };

        let mut builder = Request::builder();
        builder.method(method);
        builder.uri(&request.url);
        for (key, value) in &request.headers {
            builder.header(key.as_str(), value.as_str());
        }
        let spin_request = builder.body(request.body.unwrap_or_default()).build();

        let response: spin_sdk::http::Response = spin_sdk::http::send(spin_request)
            .await
            .map_err(|e| FetchError::RequestError(e.to_string()))?;

        let status = *response.status();
        let headers = response
            .headers()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    v.as_str().map(str::to_string).unwrap_or_default(),
                )
            })
            .collect();

        Ok(Response::new(status, headers, response.body().to_vec()))
    }
}

#[cfg(all(any(test, feature = "test-util"), not(target_arch = "wasm32")))]
pub use stub::{StubReply, StubTransport};

#[cfg(all(any(test, feature = "test-util"), not(target_arch = "wasm32")))]
mod stub {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::Transport;
    use crate::{FetchError, RequestBuilder, Response};

    /// What the stub does with one request.
    #[derive(Debug, Clone)]
    pub enum StubReply {
        /// Answer with this response.
        Respond(Response),
        /// Fail with this transport error.
        Fail(FetchError),
        /// Wait, then apply the inner reply.
        Delay(Duration, Box<StubReply>),
    }

    impl StubReply {
        /// JSON response with the given status.
        pub fn json(status: u16, value: serde_json::Value) -> Self {
            match Response::with_json(status, &value) {
                Ok(resp) => Self::Respond(resp),
                Err(e) => Self::Fail(e),
            }
        }

        /// Plain-text response with the given status.
        pub fn text(status: u16, text: &str) -> Self {
            Self::Respond(Response::with_text(status, text))
        }

        /// Delay this reply.
        pub fn after(self, delay: Duration) -> Self {
            Self::Delay(delay, Box::new(self))
        }
    }

    type Handler = dyn Fn(&RequestBuilder) -> StubReply + Send + Sync;

    /// In-process transport answering from a handler function.
    ///
    /// Every request is recorded so tests can assert on method, path,
    /// headers and body.
    #[derive(Clone)]
    pub struct StubTransport {
        handler: Arc<Handler>,
        requests: Arc<Mutex<Vec<RequestBuilder>>>,
    }

    impl StubTransport {
        /// Create a stub from a handler.
        pub fn from_fn<F>(handler: F) -> Self
        where
            F: Fn(&RequestBuilder) -> StubReply + Send + Sync + 'static,
        {
            Self {
                handler: Arc::new(handler),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Stub that answers every request the same way.
        pub fn always(reply: StubReply) -> Self {
            Self::from_fn(move |_| reply.clone())
        }

        /// Requests seen so far.
        pub fn requests(&self) -> Vec<RequestBuilder> {
            self.requests
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        }

        /// Number of requests seen so far.
        pub fn request_count(&self) -> usize {
            self.requests
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .len()
        }
    }

    impl std::fmt::Debug for StubTransport {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("StubTransport")
                .field("requests", &self.request_count())
                .finish()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
            let mut reply = (self.handler)(&request);
            self.requests
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(request);

            loop {
                match reply {
                    StubReply::Respond(resp) => return Ok(resp),
                    StubReply::Fail(err) => return Err(err),
                    StubReply::Delay(delay, inner) => {
                        tokio::time::sleep(delay).await;
                        reply = *inner;
                    }
                }
            }
        }
    }
}
