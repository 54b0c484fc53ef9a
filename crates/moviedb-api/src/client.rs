//! `TmdbClient` - call orchestrator.

use std::time::Duration;

use serde_json::Value;
use tracing::instrument;

use crate::config::{ClientConfig, HttpMethod, ResponseFormat};
use crate::decode::decode;
use crate::endpoint::{AUTH_METHOD_TYPE, method_type};
use crate::error::{Result, TmdbError};
use crate::methods::ApiMethod;
use crate::params::Params;
use crate::transport::{HttpRequest, HttpTransport, Transport};

/// Default User-Agent sent by `HttpTransport`.
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A logical API method invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Remote method name, e.g. `Movie.search`.
    pub method: String,
    /// Method parameters.
    pub params: Params,
    /// HTTP verb.
    pub http_method: HttpMethod,
    /// Format override (falls back to the configured format).
    pub format: Option<ResponseFormat>,
    /// Language override (falls back to the configured language).
    pub language: Option<String>,
}

impl CallRequest {
    /// GET call of `method`.
    #[must_use]
    pub fn get(method: impl Into<String>, params: Params) -> Self {
        Self {
            method: method.into(),
            params,
            http_method: HttpMethod::Get,
            format: None,
            language: None,
        }
    }

    /// POST call of `method`.
    #[must_use]
    pub fn post(method: impl Into<String>, params: Params) -> Self {
        Self {
            http_method: HttpMethod::Post,
            ..Self::get(method, params)
        }
    }

    /// Call of a catalog method, using its declared verb.
    #[must_use]
    pub fn for_method(method: ApiMethod, params: Params) -> Self {
        Self {
            http_method: method.http_method(),
            ..Self::get(method.name(), params)
        }
    }

    /// Overrides the response format for this call.
    #[must_use]
    pub const fn format(mut self, format: ResponseFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Overrides the response language for this call.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Raw response of one call, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResponse {
    /// Response body text.
    pub body: String,
    /// Format the call requested.
    pub format: ResponseFormat,
}

impl CallResponse {
    /// Decodes the body according to `format`.
    ///
    /// Returns `Ok(None)` for an empty body.
    ///
    /// # Errors
    ///
    /// See [`decode`](crate::decode::decode).
    pub fn decode(&self) -> Result<Option<Value>> {
        decode(&self.body, self.format)
    }
}

/// TMDb API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient<T = HttpTransport> {
    /// Read-only configuration.
    config: ClientConfig,
    /// HTTP dispatcher.
    transport: T,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    api_key: Option<String>,
    server: Option<String>,
    version: Option<String>,
    format: Option<ResponseFormat>,
    language: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            api_key: None,
            server: None,
            version: None,
            format: None,
            language: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the server endpoint (for wiremock in tests).
    #[must_use]
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Sets the API version segment (default: `2.1`).
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the default response format (default: JSON).
    #[must_use]
    pub const fn format(mut self, format: ResponseFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the default response language (default: `en`).
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the User-Agent (default: `moviedb-api/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets a per-request timeout (default: none).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration without a transport.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the API key is missing or empty.
    pub fn build_config(&self) -> Result<ClientConfig> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| TmdbError::InvalidArgument(String::from("api_key is required")))?;

        let mut config = ClientConfig::new(api_key)?;
        if let Some(server) = &self.server {
            config.set_server(server.as_str());
        }
        if let Some(version) = &self.version {
            config.set_version(version.as_str());
        }
        if let Some(format) = self.format {
            config.set_format(format);
        }
        if let Some(language) = &self.language {
            config.set_language(language.as_str());
        }
        Ok(config)
    }

    /// Builds the client with the reqwest transport.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set or empty.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let config = self.build_config()?;
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let transport = HttpTransport::new(user_agent, self.timeout)?;
        Ok(TmdbClient { config, transport })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }
}

impl<T: Transport> TmdbClient<T> {
    /// Creates a client over a caller-supplied transport.
    #[must_use]
    pub const fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the HTTP request for `request` without sending it.
    ///
    /// GET calls carry parameters in the URL and drop the language segment
    /// for `Auth` methods. POST calls carry parameters plus `type` and
    /// `api_key` in the body.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a POST whose parameters are not key-value pairs.
    pub fn prepare(&self, request: &CallRequest) -> Result<HttpRequest> {
        let format = request.format.unwrap_or_else(|| self.config.format());
        let language = request
            .language
            .as_deref()
            .unwrap_or_else(|| self.config.language());

        match request.http_method {
            HttpMethod::Get => {
                let language =
                    (method_type(&request.method) != AUTH_METHOD_TYPE).then_some(language);
                let url =
                    self.config
                        .build_call_url(&request.method, &request.params, format, language);
                Ok(HttpRequest::Get { url })
            }
            HttpMethod::Post => {
                let Params::Query(pairs) = &request.params else {
                    return Err(TmdbError::InvalidArgument(format!(
                        "{} requires key-value parameters for POST",
                        request.method
                    )));
                };
                let mut form: Vec<(String, String)> = pairs
                    .iter()
                    .filter(|(k, _)| k != "type" && k != "api_key")
                    .cloned()
                    .collect();
                form.push((String::from("type"), String::from(format.as_str())));
                form.push((String::from("api_key"), String::from(self.config.api_key())));
                Ok(HttpRequest::Post {
                    url: self.config.post_url(&request.method),
                    form,
                })
            }
        }
    }

    /// Performs one call and returns the raw, undecoded response.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a POST without key-value parameters (no I/O happens).
    /// - `Transport` if the HTTP exchange fails.
    #[instrument(skip_all, fields(method = %request.method))]
    pub async fn call(&self, request: &CallRequest) -> Result<CallResponse> {
        let http_request = self.prepare(request)?;
        let format = request.format.unwrap_or_else(|| self.config.format());

        tracing::debug!(
            verb = %request.http_method,
            url = %self.config.redact(http_request.url()),
            "TMDb API request"
        );

        let body = self.transport.execute(&http_request).await?;
        Ok(CallResponse { body, format })
    }

    /// Performs one call and decodes the response.
    ///
    /// # Errors
    ///
    /// Any error of [`call`](Self::call) or [`CallResponse::decode`].
    pub async fn call_and_decode(&self, request: &CallRequest) -> Result<Option<Value>> {
        self.call(request).await?.decode()
    }

    /// Calls a catalog method with the configured format and language.
    ///
    /// # Errors
    ///
    /// Any error of [`call_and_decode`](Self::call_and_decode).
    pub async fn invoke(&self, method: ApiMethod, params: Params) -> Result<Option<Value>> {
        self.call_and_decode(&CallRequest::for_method(method, params))
            .await
    }
}
