use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the viewroute binary.
#[derive(Debug, Parser)]
#[command(
    name = "viewroute",
    version,
    about = "Resolve action results to view templates and dispatch to them"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VIEWROUTE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP dispatcher.
    Serve(Box<ServeArgs>),
    /// Resolve a single action result and print the template target.
    Resolve(ResolveArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct TemplateOverrides {
    /// Override the directory templates are served from.
    #[arg(long = "templates-root", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub templates_root: Option<PathBuf>,

    /// Override the template file extension (for example `.jsp`).
    #[arg(long = "templates-extension", value_name = "EXT")]
    pub templates_extension: Option<String>,

    /// Override the value used when an action reports no result.
    #[arg(long = "default-result", value_name = "VALUE")]
    pub default_result: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub templates: TemplateOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub templates: TemplateOverrides,

    /// Action path whose result should be resolved, e.g. `/book/view`.
    #[arg(value_name = "ACTION")]
    pub action: String,

    /// Result reported by the action; omitted means no result.
    #[arg(long = "result", short = 'r', value_name = "RESULT")]
    pub result: Option<String>,
}
