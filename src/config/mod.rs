//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{collections::HashMap, net::SocketAddr, path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::{
    application::mapper::DEFAULT_RESULT_VALUE,
    domain::paths::{DEFAULT_TEMPLATE_EXTENSION, TemplateExtension},
};

mod cli;

pub use cli::{CliArgs, Command, ResolveArgs, ServeArgs, ServeOverrides, TemplateOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "viewroute";
const ENV_PREFIX: &str = "VIEWROUTE";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TEMPLATES_ROOT: &str = "templates";
const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub templates: TemplateSettings,
    pub results: ResultSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct TemplateSettings {
    pub root: PathBuf,
    pub extension: TemplateExtension,
    /// Content type sent with forwarded templates.
    pub content_type: String,
}

#[derive(Debug, Clone)]
pub struct ResultSettings {
    pub default_result: String,
    pub aliases: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Resolve(args)) => raw.apply_template_overrides(&args.templates),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    templates: RawTemplateSettings,
    results: RawResultSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }

        self.apply_template_overrides(&overrides.templates);
    }

    fn apply_template_overrides(&mut self, overrides: &TemplateOverrides) {
        if let Some(root) = overrides.templates_root.as_ref() {
            self.templates.root = Some(root.clone());
        }
        if let Some(extension) = overrides.templates_extension.as_ref() {
            self.templates.extension = Some(extension.clone());
        }
        if let Some(value) = overrides.default_result.as_ref() {
            self.results.default_result = Some(value.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            templates,
            results,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            templates: build_template_settings(templates)?,
            results: build_result_settings(results)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_template_settings(templates: RawTemplateSettings) -> Result<TemplateSettings, LoadError> {
    let root = templates
        .root
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATES_ROOT));
    if root.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "templates.root",
            "path must not be empty",
        ));
    }

    let extension = templates
        .extension
        .unwrap_or_else(|| DEFAULT_TEMPLATE_EXTENSION.to_string());
    let extension = TemplateExtension::new(extension)
        .map_err(|err| LoadError::invalid("templates.extension", err.to_string()))?;

    let content_type = match templates.content_type {
        Some(value) => value.trim().to_string(),
        None => guess_content_type(&extension),
    };
    if content_type.is_empty() {
        return Err(LoadError::invalid(
            "templates.content_type",
            "must not be empty",
        ));
    }

    Ok(TemplateSettings {
        root,
        extension,
        content_type,
    })
}

/// Text MIME type registered for the template extension, if any.
fn guess_content_type(extension: &TemplateExtension) -> String {
    let ext = extension.as_str().trim_start_matches('.');
    mime_guess::from_ext(ext)
        .iter()
        .find(|mime| mime.type_() == mime_guess::mime::TEXT)
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

fn build_result_settings(results: RawResultSettings) -> Result<ResultSettings, LoadError> {
    let default_result = results
        .default_result
        .unwrap_or_else(|| DEFAULT_RESULT_VALUE.to_string());
    if default_result.trim().is_empty() {
        return Err(LoadError::invalid(
            "results.default_result",
            "must not be empty",
        ));
    }

    if let Some(name) = results
        .aliases
        .keys()
        .find(|name| name.is_empty() || name.contains(['<', '>']))
    {
        return Err(LoadError::invalid(
            "results.aliases",
            format!("alias name `{name}` must be non-empty and free of `<` and `>`"),
        ));
    }

    Ok(ResultSettings {
        default_result,
        aliases: results.aliases,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTemplateSettings {
    root: Option<PathBuf>,
    extension: Option<String>,
    content_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawResultSettings {
    default_result: Option<String>,
    aliases: HashMap<String, String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

#[cfg(test)]
mod tests;
