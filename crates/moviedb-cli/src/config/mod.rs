//! Application configuration module.
//!
//! Manages the TOML config file holding the API key and the default
//! server, version, format and language.

#[allow(clippy::module_inception)]
mod config;
mod paths;

pub use config::AppConfig;
pub use paths::resolve_config_path;
