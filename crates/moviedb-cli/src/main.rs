//! moviedb - TMDb 2.1 API command-line client.

/// Application configuration (TOML).
mod config;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use moviedb_api::{
    ApiMethod, CallRequest, CallResponse, HttpMethod, Params, ResponseFormat, TmdbClient,
};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, resolve_config_path};

/// Environment variable consulted for the API key when neither the flag
/// nor the config file provides one.
const API_KEY_ENV: &str = "MOVIEDB_API_KEY";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// API key (overrides config and `MOVIEDB_API_KEY`).
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// API server endpoint (overrides config).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Call an API method and print the decoded response.
    Call(CallArgs),
    /// List the known API methods.
    Methods,
    /// Configuration file operations.
    Config(ConfigCommand),
}

/// Arguments for the `call` subcommand.
#[derive(clap::Args)]
struct CallArgs {
    /// API method name (e.g. "Movie.search").
    method: String,

    /// Key-value parameter, repeatable (e.g. --param order_by=rating).
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Path parameter segment, repeatable (e.g. --path "Fight Club").
    #[arg(long = "path", value_name = "SEGMENT", conflicts_with = "params")]
    paths: Vec<String>,

    /// Send the call as HTTP POST regardless of the catalog entry.
    #[arg(long)]
    post: bool,

    /// Response format override (json, xml, yaml).
    #[arg(long)]
    format: Option<ResponseFormat>,

    /// Response language override.
    #[arg(long)]
    language: Option<String>,

    /// Print the raw response body instead of decoding it.
    #[arg(long)]
    raw: bool,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show the config file with the API key masked.
    Show,
    /// Write a config file from the global flags.
    Init(ConfigInitArgs),
}

/// Arguments for the `config init` subcommand.
#[derive(clap::Args)]
struct ConfigInitArgs {
    /// Default response format.
    #[arg(long)]
    format: Option<ResponseFormat>,

    /// Default response language.
    #[arg(long)]
    language: Option<String>,

    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

/// Parses `KEY=VALUE`.
fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((String::from(key), String::from(value)))
}

/// Picks the first non-blank API key: flag, then config file, then environment.
fn resolve_api_key(
    flag: Option<&str>,
    config: Option<&str>,
    env: Option<String>,
) -> Option<String> {
    let usable = |key: &&str| !key.trim().is_empty();
    flag.filter(usable)
        .or_else(|| config.filter(usable))
        .map(String::from)
        .or_else(|| env.filter(|key| !key.trim().is_empty()))
}

/// Builds the client from CLI flags, the config file and the environment.
///
/// # Errors
///
/// Returns an error if no API key is found or the client fails to build.
fn build_client(cli: &Cli, config: &AppConfig, config_path: &Path) -> Result<TmdbClient> {
    let api_key = resolve_api_key(
        cli.api_key.as_deref(),
        config.api.key.as_deref(),
        std::env::var(API_KEY_ENV).ok(),
    )
    .with_context(|| {
        format!(
            "API key is required: pass --api-key, set [api].key in {}, or export {API_KEY_ENV}",
            config_path.display()
        )
    })?;

    let mut builder = TmdbClient::builder().api_key(api_key).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(server) = cli.server.as_ref().or(config.api.server.as_ref()) {
        builder = builder.server(server.as_str());
    }
    if let Some(version) = &config.api.version {
        builder = builder.version(version.as_str());
    }
    if let Some(format) = config.api.format {
        builder = builder.format(format);
    }
    if let Some(language) = &config.api.language {
        builder = builder.language(language.as_str());
    }
    if let Some(secs) = config.api.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("failed to build TMDb client")
}

/// Turns `call` arguments into a request.
///
/// Catalog methods use their declared verb; unknown names default to GET.
fn build_request(args: &CallArgs) -> CallRequest {
    let params = if !args.params.is_empty() {
        Params::Query(args.params.clone())
    } else if !args.paths.is_empty() {
        Params::segments(args.paths.iter().cloned())
    } else {
        Params::None
    };

    let mut request = match args.method.parse::<ApiMethod>() {
        Ok(method) => CallRequest::for_method(method, params),
        Err(_) => {
            tracing::debug!(method = %args.method, "Method not in catalog, sending as-is");
            CallRequest::get(args.method.as_str(), params)
        }
    };
    if args.post {
        request.http_method = HttpMethod::Post;
    }
    if let Some(format) = args.format {
        request = request.format(format);
    }
    if let Some(language) = &args.language {
        request = request.language(language.as_str());
    }
    request
}

/// Logs a response, decoded unless `raw` is set.
///
/// # Errors
///
/// Returns an error if decoding fails.
fn report_response(response: &CallResponse, raw: bool) -> Result<()> {
    if raw {
        tracing::info!("{}", response.body);
        return Ok(());
    }

    let decoded = response
        .decode()
        .with_context(|| format!("failed to decode {} response", response.format))?;
    match decoded {
        Some(value) => {
            let pretty =
                serde_json::to_string_pretty(&value).context("failed to render response")?;
            tracing::info!("{pretty}");
        }
        None => tracing::info!("No content"),
    }
    Ok(())
}

/// Runs the `call` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build, the call fails,
/// or the response cannot be decoded.
#[instrument(skip_all, fields(method = %args.method))]
async fn run_call(cli: &Cli, args: &CallArgs) -> Result<()> {
    let config_path = resolve_config_path(cli.dir.as_ref()).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    let client = build_client(cli, &config, &config_path)?;

    let request = build_request(args);
    let response = client
        .call(&request)
        .await
        .with_context(|| format!("{} {} request failed", request.http_method, request.method))?;

    report_response(&response, args.raw)
}

/// Runs the `methods` subcommand.
fn run_methods() {
    tracing::info!("Method\t\t\tVerb\tParams");
    for method in ApiMethod::ALL {
        tracing::info!(
            "{:<24}{}\t{}",
            method.name(),
            method.http_method(),
            method.shape()
        );
    }
    tracing::info!("Total: {} methods", ApiMethod::ALL.len());
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or rendered.
fn run_config_show(cli: &Cli) -> Result<()> {
    let config_path = resolve_config_path(cli.dir.as_ref()).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    let rendered =
        toml::to_string_pretty(&config.masked()).context("failed to serialize config to TOML")?;

    tracing::info!("# {}", config_path.display());
    tracing::info!("{rendered}");
    Ok(())
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file exists without `--force` or cannot be written.
fn run_config_init(cli: &Cli, args: &ConfigInitArgs) -> Result<()> {
    let config_path = resolve_config_path(cli.dir.as_ref()).context("failed to resolve config path")?;
    if config_path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let mut config = AppConfig::default();
    config.api.key.clone_from(&cli.api_key);
    config.api.server.clone_from(&cli.server);
    config.api.format = args.format;
    config.api.language.clone_from(&args.language);
    config.save(&config_path)?;

    tracing::info!("Wrote {}", config_path.display());
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    match &cli.command {
        Commands::Call(args) => run_call(&cli, args).await,
        Commands::Methods => {
            run_methods();
            Ok(())
        }
        Commands::Config(cmd) => match &cmd.command {
            ConfigSubcommands::Show => run_config_show(&cli),
            ConfigSubcommands::Init(args) => run_config_init(&cli, args),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use tracing::subscriber::with_default;
    use tracing_mock::{expect, subscriber};

    use super::*;

    fn call_args(method: &str) -> CallArgs {
        CallArgs {
            method: String::from(method),
            params: Vec::new(),
            paths: Vec::new(),
            post: false,
            format: None,
            language: None,
            raw: false,
        }
    }

    #[test]
    fn test_parse_key_value() {
        // Arrange & Act & Assert
        assert_eq!(
            parse_key_value("query=a=b").unwrap(),
            (String::from("query"), String::from("a=b"))
        );
        assert_eq!(
            parse_key_value("page=").unwrap(),
            (String::from("page"), String::new())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=1").is_err());
    }

    #[test]
    fn test_resolve_api_key_precedence() {
        // Arrange & Act & Assert
        assert_eq!(
            resolve_api_key(Some("flag"), Some("file"), Some(String::from("env"))).as_deref(),
            Some("flag")
        );
        assert_eq!(
            resolve_api_key(None, Some("file"), Some(String::from("env"))).as_deref(),
            Some("file")
        );
        assert_eq!(
            resolve_api_key(None, None, Some(String::from("env"))).as_deref(),
            Some("env")
        );
        assert!(resolve_api_key(None, None, None).is_none());
    }

    #[test]
    fn test_resolve_api_key_skips_blank_sources() {
        // Arrange & Act & Assert
        assert_eq!(
            resolve_api_key(Some(""), Some("file"), None).as_deref(),
            Some("file")
        );
        assert_eq!(
            resolve_api_key(Some("  "), Some(""), Some(String::from("env"))).as_deref(),
            Some("env")
        );
        assert!(resolve_api_key(Some(""), Some(" "), Some(String::new())).is_none());
    }

    #[test]
    fn test_build_request_uses_catalog_verb() {
        // Arrange
        let mut args = call_args("Movie.addRating");
        args.params = vec![(String::from("id"), String::from("550"))];

        // Act
        let request = build_request(&args);

        // Assert
        assert_eq!(request.http_method, HttpMethod::Post);
        assert_eq!(request.params, Params::query([("id", "550")]));
    }

    #[test]
    fn test_build_request_unknown_method_defaults_to_get() {
        // Arrange
        let mut args = call_args("Movie.getCast");
        args.paths = vec![String::from("550")];
        args.format = Some(ResponseFormat::Xml);
        args.language = Some(String::from("de"));

        // Act
        let request = build_request(&args);

        // Assert
        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(request.params, Params::path("550"));
        assert_eq!(request.format, Some(ResponseFormat::Xml));
        assert_eq!(request.language.as_deref(), Some("de"));
    }

    #[test]
    fn test_build_request_post_flag_wins() {
        // Arrange
        let mut args = call_args("Movie.search");
        args.post = true;

        // Act
        let request = build_request(&args);

        // Assert
        assert_eq!(request.http_method, HttpMethod::Post);
        assert_eq!(request.params, Params::None);
    }

    #[test]
    fn test_report_empty_response_logs_no_content() {
        // Arrange
        let response = CallResponse {
            body: String::new(),
            format: ResponseFormat::Json,
        };
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().with_fields(expect::msg("No content")))
            .only()
            .run_with_handle();

        // Act
        with_default(subscriber, || {
            report_response(&response, false).unwrap();
        });

        // Assert
        handle.assert_finished();
    }

    #[test]
    fn test_report_raw_logs_body_verbatim() {
        // Arrange
        let response = CallResponse {
            body: String::from("<movies/>"),
            format: ResponseFormat::Xml,
        };
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().with_fields(expect::msg("<movies/>")))
            .only()
            .run_with_handle();

        // Act
        with_default(subscriber, || {
            report_response(&response, true).unwrap();
        });

        // Assert
        handle.assert_finished();
    }

    #[test]
    fn test_report_malformed_response_fails() {
        // Arrange
        let response = CallResponse {
            body: String::from("{broken"),
            format: ResponseFormat::Json,
        };

        // Act
        let result = report_response(&response, false);

        // Assert
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("failed to decode json"));
    }
}
