//! Call URL assembly: base URL, method type and GET/POST endpoints.

use crate::config::{ClientConfig, ResponseFormat};
use crate::params::Params;

/// Method type of the authentication family, whose URLs carry no language.
pub const AUTH_METHOD_TYPE: &str = "Auth";

/// Returns the method type: the part of `method` before the first `.`.
///
/// `"Movie.search"` gives `"Movie"`; a name without a dot is its own type.
#[must_use]
pub fn method_type(method: &str) -> &str {
    method.split_once('.').map_or(method, |(kind, _)| kind)
}

impl ClientConfig {
    /// Server address with exactly one trailing slash, followed by the
    /// version segment and a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        let server = self.server().trim().trim_end_matches('/');
        format!("{server}/{}/", self.version())
    }

    /// Builds a GET call URL:
    /// `{base}{method}/{language}/{format}/{key}` plus the parameter suffix.
    ///
    /// The language segment is left out when `language` is `None`.
    #[must_use]
    pub fn build_call_url(
        &self,
        method: &str,
        params: &Params,
        format: ResponseFormat,
        language: Option<&str>,
    ) -> String {
        let mut parts = vec![method];
        if let Some(lang) = language {
            parts.push(lang);
        }
        parts.push(format.as_str());
        parts.push(self.api_key());

        let mut call_url = self.base_url();
        call_url.push_str(&parts.join("/"));
        if let Some(suffix) = params.url_suffix() {
            call_url.push_str(&suffix);
        }
        call_url
    }

    /// Builds a POST call URL: `{base}{method}`.
    #[must_use]
    pub fn post_url(&self, method: &str) -> String {
        format!("{}{method}", self.base_url())
    }

    /// Replaces the API key in `text` for logging.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        text.replace(self.api_key(), "<api_key>")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn config_with_server(server: &str) -> ClientConfig {
        let mut config = ClientConfig::new("KEY").unwrap();
        config.set_server(server);
        config
    }

    #[test]
    fn test_base_url_adds_missing_slash() {
        // Arrange
        let config = config_with_server("http://x");

        // Act & Assert
        assert_eq!(config.base_url(), "http://x/2.1/");
    }

    #[test]
    fn test_base_url_keeps_single_slash() {
        // Arrange
        let config = config_with_server("http://x/");

        // Act & Assert
        assert_eq!(config.base_url(), "http://x/2.1/");
    }

    #[test]
    fn test_base_url_collapses_repeated_slashes_and_whitespace() {
        // Arrange
        let config = config_with_server(" http://x// ");

        // Act & Assert
        assert_eq!(config.base_url(), "http://x/2.1/");
    }

    #[test]
    fn test_base_url_uses_configured_version() {
        // Arrange
        let mut config = config_with_server("https://api.example.org/");
        config.set_version("3");

        // Act & Assert
        assert_eq!(config.base_url(), "https://api.example.org/3/");
    }

    #[test]
    fn test_method_type() {
        // Arrange & Act & Assert
        assert_eq!(method_type("Movie.search"), "Movie");
        assert_eq!(method_type("Auth.getToken"), "Auth");
        assert_eq!(method_type("Movie.images.get"), "Movie");
        assert_eq!(method_type("Genres"), "Genres");
    }

    #[test]
    fn test_call_url_segment_order() {
        // Arrange
        let config = config_with_server("http://x");

        // Act
        let url = config.build_call_url(
            "Movie.search",
            &Params::path("Alien"),
            ResponseFormat::Json,
            Some("en"),
        );

        // Assert
        assert_eq!(url, "http://x/2.1/Movie.search/en/json/KEY/Alien");
    }

    #[test]
    fn test_call_url_without_language() {
        // Arrange
        let config = config_with_server("http://x");

        // Act
        let url = config.build_call_url("Auth.getToken", &Params::None, ResponseFormat::Xml, None);

        // Assert
        assert_eq!(url, "http://x/2.1/Auth.getToken/xml/KEY");
    }

    #[test]
    fn test_call_url_appends_query_after_key() {
        // Arrange
        let config = config_with_server("http://x");
        let params = Params::query([("a", "1"), ("b", "2")]);

        // Act
        let url = config.build_call_url("Movie.browse", &params, ResponseFormat::Json, Some("en"));

        // Assert
        assert_eq!(url, "http://x/2.1/Movie.browse/en/json/KEY?a=1&b=2");
    }

    #[test]
    fn test_post_url() {
        // Arrange
        let config = config_with_server("http://x/");

        // Act & Assert
        assert_eq!(config.post_url("Movie.addRating"), "http://x/2.1/Movie.addRating");
    }

    #[test]
    fn test_redact_hides_key() {
        // Arrange
        let config = config_with_server("http://x");
        let url = config.build_call_url("Movie.getInfo", &Params::path("550"), ResponseFormat::Json, Some("en"));

        // Act
        let redacted = config.redact(&url);

        // Assert
        assert_eq!(redacted, "http://x/2.1/Movie.getInfo/en/json/<api_key>/550");
    }
}
