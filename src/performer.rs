//! Request performers
//!
//! The engine only needs a narrow `perform(request) -> response-or-error`
//! capability; transport concerns (TLS, proxying, timeouts) live behind the
//! `Performer` trait. The real implementation drives reqwest's blocking
//! client.

use std::time::Duration;

use thiserror::Error;

use crate::request::RequestDescriptor;
use crate::response::Response;

/// Errors from executing a request against the network.
#[derive(Debug, Error)]
pub enum PerformError {
    /// Transport-level failure: connection refused, DNS, timeout, TLS
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an error status
    #[error("{method} {url} failed with status {status}")]
    HttpStatus {
        method: String,
        url: String,
        status: u16,
    },

    /// A header or method the transport cannot represent
    #[error("invalid request component: {0}")]
    InvalidRequest(String),
}

/// Executes a request descriptor and returns the raw response.
pub trait Performer {
    fn perform(&self, request: &RequestDescriptor) -> Result<Response, PerformError>;
}

/// Performer backed by reqwest's blocking client.
///
/// A client is built per call because the proxy target is part of the
/// request descriptor, not ambient configuration. No timeout is imposed
/// unless the caller sets one.
#[derive(Debug, Default)]
pub struct HttpPerformer {
    timeout: Option<Duration>,
}

impl HttpPerformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn build_client(&self, request: &RequestDescriptor) -> Result<reqwest::blocking::Client, PerformError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        } else {
            // reqwest defaults to 30s; the contract is no internally
            // imposed timeout.
            builder = builder.timeout(None);
        }
        if let Some(proxy) = request.proxy() {
            builder = builder.proxy(reqwest::Proxy::all(format!("http://{proxy}"))?);
        }
        Ok(builder.build()?)
    }
}

impl Performer for HttpPerformer {
    fn perform(&self, request: &RequestDescriptor) -> Result<Response, PerformError> {
        let client = self.build_client(request)?;

        let method = reqwest::Method::from_bytes(request.method().as_bytes())
            .map_err(|_| PerformError::InvalidRequest(format!("method {}", request.method())))?;

        let mut builder = client.request(method, request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();

        let mut headers = Vec::new();
        for (name, value) in response.headers() {
            let value = value
                .to_str()
                .map_err(|_| PerformError::InvalidRequest(format!("header {name} is not UTF-8")))?
                .to_string();
            headers.push((name.as_str().to_string(), value));
        }

        let body = response.bytes()?.to_vec();

        if status >= 400 {
            return Err(PerformError::HttpStatus {
                method: request.method().to_string(),
                url: request.url().to_string(),
                status,
            });
        }

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
