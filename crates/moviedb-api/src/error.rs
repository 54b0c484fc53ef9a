//! Error taxonomy for API calls.

use crate::config::ResponseFormat;

/// Maximum number of body bytes echoed in error messages.
const BODY_PREVIEW_LEN: usize = 200;

/// Errors returned by the client. None of them are retried internally.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum TmdbError {
    /// A caller-supplied value is unusable (empty API key, POST without
    /// key-value parameters, unknown format name).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The HTTP exchange failed: connection error, timeout or non-2xx status.
    #[error("transport error (status={}): {message}", .status.map_or_else(|| String::from("none"), |s| s.to_string()))]
    Transport {
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Failure description or response body preview.
        message: String,
    },

    /// The body is not well-formed for the declared format.
    #[error("failed to decode {format} response (len={}): {message}", .body.len())]
    Decode {
        /// Format the body was decoded as.
        format: ResponseFormat,
        /// Original response body.
        body: String,
        /// Parser diagnostic.
        message: String,
    },

    /// YAML was requested but no YAML engine is compiled in.
    #[error("no YAML parser available (enable the `yaml` feature)")]
    NoYamlParserAvailable,
}

impl TmdbError {
    /// Builds a transport error for a non-success HTTP status.
    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self::Transport {
            status: Some(status),
            message: preview(body),
        }
    }

    /// Builds a transport error for a failure without an HTTP response.
    pub(crate) fn connection(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code carried by a transport error.
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

/// Truncates a body to `BODY_PREVIEW_LEN` bytes on a char boundary.
fn preview(body: &str) -> String {
    if body.len() <= BODY_PREVIEW_LEN {
        return String::from(body);
    }
    let mut end = BODY_PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    body.get(..end)
        .map_or_else(String::new, |head| format!("{head}..."))
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TmdbError>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_status_error_keeps_code() {
        // Arrange & Act
        let err = TmdbError::status(404, "Not Found");

        // Assert
        assert_eq!(err.http_status(), Some(404));
        assert!(err.to_string().contains("status=404"));
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn test_connection_error_has_no_status() {
        // Arrange & Act
        let err = TmdbError::connection("connection refused");

        // Assert
        assert_eq!(err.http_status(), None);
        assert!(err.to_string().contains("status=none"));
    }

    #[test]
    fn test_long_body_is_truncated() {
        // Arrange
        let body = "é".repeat(300);

        // Act
        let err = TmdbError::status(500, &body);

        // Assert
        let TmdbError::Transport { message, .. } = err else {
            panic!("expected transport error");
        };
        assert!(message.ends_with("..."));
        assert!(message.len() <= BODY_PREVIEW_LEN + 3);
    }

    #[test]
    fn test_decode_error_mentions_format() {
        // Arrange & Act
        let err = TmdbError::Decode {
            format: ResponseFormat::Xml,
            body: String::from("<a>"),
            message: String::from("unclosed element"),
        };

        // Assert
        assert_eq!(err.to_string(), "failed to decode xml response (len=3): unclosed element");
    }
}
