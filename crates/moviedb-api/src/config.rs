//! Client configuration: API key, server, version and response defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TmdbError};

/// Default API server endpoint.
pub const DEFAULT_SERVER: &str = "http://api.themoviedb.org/";

/// Default API version segment.
pub const DEFAULT_VERSION: &str = "2.1";

/// Default response language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Response serialization requested through the URL path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// `json`
    #[default]
    Json,
    /// `xml`
    Xml,
    /// `yaml`
    Yaml,
}

impl ResponseFormat {
    /// Returns the wire name used in URLs and POST bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = TmdbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(TmdbError::InvalidArgument(format!(
                "unknown response format: {other}"
            ))),
        }
    }
}

/// HTTP verb used for an API call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Parameters travel in the URL.
    #[default]
    Get,
    /// Parameters travel in a form-encoded body.
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Client configuration shared by every call.
///
/// Read-only during calls; the setters exist for callers that reuse one
/// configuration across servers or languages.
#[derive(Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct ClientConfig {
    api_key: String,
    server: String,
    version: String,
    format: ResponseFormat,
    language: String,
}

impl ClientConfig {
    /// Creates a configuration with the default server, version, format and language.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = validate_api_key(api_key.into())?;
        Ok(Self {
            api_key,
            server: String::from(DEFAULT_SERVER),
            version: String::from(DEFAULT_VERSION),
            format: ResponseFormat::default(),
            language: String::from(DEFAULT_LANGUAGE),
        })
    }

    /// API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Server endpoint as configured.
    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// API version segment.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Default response format.
    #[must_use]
    pub const fn format(&self) -> ResponseFormat {
        self.format
    }

    /// Default response language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Replaces the API key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `api_key` is empty.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<()> {
        self.api_key = validate_api_key(api_key.into())?;
        Ok(())
    }

    /// Replaces the server endpoint.
    pub fn set_server(&mut self, server: impl Into<String>) {
        self.server = server.into();
    }

    /// Replaces the API version segment.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Replaces the default response format.
    pub const fn set_format(&mut self, format: ResponseFormat) {
        self.format = format;
    }

    /// Replaces the default response language.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("server", &self.server)
            .field("version", &self.version)
            .field("format", &self.format)
            .field("language", &self.language)
            .finish()
    }
}

fn validate_api_key(api_key: String) -> Result<String> {
    if api_key.trim().is_empty() {
        return Err(TmdbError::InvalidArgument(String::from(
            "API key must not be empty",
        )));
    }
    Ok(api_key)
}
