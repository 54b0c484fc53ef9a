//! Catalog of remote API methods.
//!
//! Each entry binds a method name to its HTTP verb and parameter shape; the
//! client turns an entry plus `Params` into a call, so there is no
//! hand-written wrapper per endpoint.

use std::fmt;
use std::str::FromStr;

use crate::config::HttpMethod;
use crate::error::{Result, TmdbError};

/// Expected parameter shape of a catalog method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    /// Takes no parameters.
    None,
    /// One or more path segments.
    Path,
    /// Optional query-string filters.
    Query,
    /// Form fields in a POST body.
    Form,
}

impl fmt::Display for ParamShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Path => "path",
            Self::Query => "query",
            Self::Form => "form",
        })
    }
}

macro_rules! api_methods {
    ($(
        $(#[$doc:meta])*
        $variant:ident => $name:literal, $verb:ident, $shape:ident;
    )+) => {
        /// A remote API method.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ApiMethod {
            $(
                $(#[$doc])*
                $variant,
            )+
        }

        impl ApiMethod {
            /// Every catalog entry, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Remote method name (`Type.verb`).
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// HTTP verb used by the method.
            #[must_use]
            pub const fn http_method(self) -> HttpMethod {
                match self {
                    $(Self::$variant => HttpMethod::$verb,)+
                }
            }

            /// Parameter shape the method expects.
            #[must_use]
            pub const fn shape(self) -> ParamShape {
                match self {
                    $(Self::$variant => ParamShape::$shape,)+
                }
            }
        }
    };
}

api_methods! {
    /// Requests an authentication token.
    AuthGetToken => "Auth.getToken", Get, None;
    /// Exchanges a granted token for a session.
    AuthGetSession => "Auth.getSession", Get, Path;
    /// Links a file hash to a movie.
    MediaAddId => "Media.addID", Post, Form;
    /// Looks up a movie by file hash and byte size.
    MediaGetInfo => "Media.getInfo", Get, Path;
    /// Rates a movie.
    MovieAddRating => "Movie.addRating", Post, Form;
    /// Browses movies with ordering and filters.
    MovieBrowse => "Movie.browse", Get, Query;
    /// Lists posters and backdrops of a movie.
    MovieGetImages => "Movie.getImages", Get, Path;
    /// Fetches full movie details.
    MovieGetInfo => "Movie.getInfo", Get, Path;
    /// Fetches the most recently added movie.
    MovieGetLatest => "Movie.getLatest", Get, None;
    /// Lists available translations of a movie.
    MovieGetTranslations => "Movie.getTranslations", Get, Path;
    /// Fetches version numbers of one or more movies.
    MovieGetVersion => "Movie.getVersion", Get, Path;
    /// Looks up a movie by IMDb ID.
    MovieImdbLookup => "Movie.imdbLookup", Get, Path;
    /// Searches movies by title (optionally with year).
    MovieSearch => "Movie.search", Get, Path;
    /// Fetches full person details.
    PersonGetInfo => "Person.getInfo", Get, Path;
    /// Fetches the most recently added person.
    PersonGetLatest => "Person.getLatest", Get, None;
    /// Fetches version numbers of one or more people.
    PersonGetVersion => "Person.getVersion", Get, Path;
    /// Searches people by name.
    PersonSearch => "Person.search", Get, Path;
    /// Lists movie genres.
    GenresGetList => "Genres.getList", Get, None;
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ApiMethod {
    type Err = TmdbError;

    /// Looks a method up by its remote name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|method| method.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TmdbError::InvalidArgument(format!("unknown API method: {s}")))
    }
}
