//! API call parameters and their URL encodings.

use url::form_urlencoded;

/// Parameters passed to an API method.
///
/// GET calls render `Query` as a query string and `Path` as trailing path
/// segments. POST calls accept only `Query`, sent as the form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Params {
    /// No parameters.
    #[default]
    None,
    /// Key-value pairs in insertion order.
    Query(Vec<(String, String)>),
    /// Raw path segments, escaped individually when rendered.
    Path(Vec<String>),
}

impl Params {
    /// Single path segment, e.g. a search title or a movie ID.
    #[must_use]
    pub fn path(segment: impl Into<String>) -> Self {
        Self::Path(vec![segment.into()])
    }

    /// Several path segments joined by `/`.
    #[must_use]
    pub fn segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Path(segments.into_iter().map(Into::into).collect())
    }

    /// Key-value pairs in the given order.
    #[must_use]
    pub fn query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Query(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Parameters for `Movie.browse`: optional filters followed by
    /// `order` and `order_by`.
    #[must_use]
    pub fn browse(order_by: &str, order: &str, extra: Vec<(String, String)>) -> Self {
        let mut pairs = extra;
        pairs.retain(|(k, _)| k != "order" && k != "order_by");
        pairs.push((String::from("order"), String::from(order)));
        pairs.push((String::from("order_by"), String::from(order_by)));
        Self::Query(pairs)
    }

    /// Parameters for `Media.getInfo`: file hash and byte size.
    #[must_use]
    pub fn media_info(hash: &str, bytesize: u64) -> Self {
        Self::segments([String::from(hash), bytesize.to_string()])
    }

    /// Returns `true` for `Params::Query`.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Renders the URL suffix for a GET call: `?k=v&...`, `/seg/...`, or
    /// `None` when nothing should be appended.
    ///
    /// An empty mapping and a path made only of empty segments render
    /// nothing, so a bare `?` or trailing `/` never reaches the server.
    #[must_use]
    pub fn url_suffix(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Query(pairs) if pairs.is_empty() => None,
            Self::Query(pairs) => Some(format!("?{}", encode_query(pairs))),
            Self::Path(segments) => {
                let escaped: Vec<String> = segments
                    .iter()
                    .filter(|s| !s.is_empty())
                    .map(|s| escape_segment(s))
                    .collect();
                if escaped.is_empty() {
                    None
                } else {
                    Some(format!("/{}", escaped.join("/")))
                }
            }
        }
    }
}

/// Encodes pairs as `application/x-www-form-urlencoded`, preserving order.
#[must_use]
pub fn encode_query(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Parses a query string (with or without a leading `?`) into ordered pairs.
#[must_use]
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Escapes one path segment the way form encoding escapes a value
/// (space becomes `+`, `/` becomes `%2F`).
fn escape_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_suffix_keeps_insertion_order() {
        // Arrange
        let params = Params::query([("b", "2"), ("a", "1")]);

        // Act
        let suffix = params.url_suffix();

        // Assert
        assert_eq!(suffix.as_deref(), Some("?b=2&a=1"));
    }

    #[test]
    fn test_query_suffix_escapes_values() {
        // Arrange
        let params = Params::query([("query", "Fight Club & co")]);

        // Act
        let suffix = params.url_suffix();

        // Assert
        assert_eq!(suffix.as_deref(), Some("?query=Fight+Club+%26+co"));
    }

    #[test]
    fn test_path_suffix_escapes_scalar() {
        // Arrange
        let params = Params::path("AC/DC live");

        // Act
        let suffix = params.url_suffix();

        // Assert
        assert_eq!(suffix.as_deref(), Some("/AC%2FDC+live"));
    }

    #[test]
    fn test_media_info_renders_two_segments() {
        // Arrange
        let params = Params::media_info("907172e7fe51ba57", 742_086_656);

        // Act
        let suffix = params.url_suffix();

        // Assert
        assert_eq!(suffix.as_deref(), Some("/907172e7fe51ba57/742086656"));
    }

    #[test]
    fn test_empty_params_render_nothing() {
        // Arrange & Act & Assert
        assert_eq!(Params::None.url_suffix(), None);
        assert_eq!(Params::Query(Vec::new()).url_suffix(), None);
        assert_eq!(Params::path("").url_suffix(), None);
    }

    #[test]
    fn test_browse_appends_order_fields_last() {
        // Arrange
        let extra = vec![
            (String::from("page"), String::from("2")),
            (String::from("order"), String::from("ignored")),
        ];

        // Act
        let params = Params::browse("rating", "desc", extra);

        // Assert
        assert_eq!(
            params,
            Params::query([("page", "2"), ("order", "desc"), ("order_by", "rating")])
        );
    }

    #[test]
    fn test_query_roundtrip_preserves_mapping() {
        // Arrange
        let pairs = vec![
            (String::from("query"), String::from("Amélie (2001)")),
            (String::from("genres"), String::from("18,35")),
            (String::from("empty"), String::new()),
            (String::from("sym"), String::from("a+b=c&d?")),
        ];

        // Act
        let encoded = encode_query(&pairs);
        let parsed = parse_query(&format!("?{encoded}"));

        // Assert
        assert_eq!(parsed, pairs);
    }
}
