//! Client library for the TMDb 2.1 movie metadata API.
//!
//! Builds call URLs from a [`ClientConfig`], dispatches GET/POST requests
//! through a [`Transport`], and decodes JSON, XML or YAML bodies into a
//! generic [`serde_json::Value`] tree.

mod client;
mod config;
mod decode;
mod endpoint;
mod error;
mod methods;
mod params;
mod transport;

pub use client::{CallRequest, CallResponse, TmdbClient, TmdbClientBuilder};
pub use config::{
    ClientConfig, DEFAULT_LANGUAGE, DEFAULT_SERVER, DEFAULT_VERSION, HttpMethod, ResponseFormat,
};
pub use decode::{XML_ATTRIBUTE_PREFIX, XML_TEXT_KEY, YAML_ENGINES, YamlEngine, decode};
pub use endpoint::{AUTH_METHOD_TYPE, method_type};
pub use error::{Result, TmdbError};
pub use methods::{ApiMethod, ParamShape};
pub use params::{Params, encode_query, parse_query};
pub use transport::{HttpRequest, HttpTransport, LocalTransport, Transport};
