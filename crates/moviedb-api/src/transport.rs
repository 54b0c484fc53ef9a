//! HTTP dispatcher: executes one request and returns the body text.
#![allow(clippy::future_not_send)]

use std::time::Duration;

use reqwest::Client;
use tracing::instrument;

use crate::error::{Result, TmdbError};

/// A fully built HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpRequest {
    /// GET with all parameters in the URL.
    Get {
        /// Call URL.
        url: String,
    },
    /// POST with a form-encoded body.
    Post {
        /// Call URL.
        url: String,
        /// Body fields in order.
        form: Vec<(String, String)>,
    },
}

impl HttpRequest {
    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Get { url } | Self::Post { url, .. } => url,
        }
    }
}

/// Transport trait.
///
/// Abstracts the HTTP exchange for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Executes `request` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::Transport` on connection failure, timeout,
    /// unreadable body, or a non-2xx status.
    async fn execute(&self, request: &HttpRequest) -> Result<String>;
}

/// reqwest-backed transport (gzip enabled).
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    /// Builds a transport with the given User-Agent and optional request timeout.
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::Transport` if the `reqwest::Client` cannot be built.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent).gzip(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| TmdbError::connection(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http_client })
    }
}

impl Transport for HttpTransport {
    #[instrument(skip_all)]
    async fn execute(&self, request: &HttpRequest) -> Result<String> {
        let builder = match request {
            HttpRequest::Get { url } => self.http_client.get(url),
            HttpRequest::Post { url, form } => self.http_client.post(url).form(form),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TmdbError::connection(format!("request timed out: {e}"))
            } else {
                TmdbError::connection(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TmdbError::connection(format!("failed to read response body: {e}")))?;

        tracing::debug!(%status, body_len = body.len(), "Response body received");

        if !status.is_success() {
            return Err(TmdbError::status(status.as_u16(), &body));
        }
        Ok(body)
    }
}
