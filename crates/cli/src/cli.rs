//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::LogSettings;
use observability::ObservabilityConfig;
use std::path::{Path, PathBuf};

/// portctl - inspect configurations and exercise event ports
#[derive(Parser, Debug)]
#[command(
    name = "portctl",
    author,
    version,
    about = "Event port runtime tooling",
    long_about = "Validates runtime configuration files and runs an in-process \n\
                  exchange between two connected event ports."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "PORTCTL_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format, overrides `[logging].format`
    #[arg(long, value_enum, global = true, env = "PORTCTL_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),

    /// Run a ping/pong exchange between two connected ports
    Exchange(ExchangeArgs),
}

impl Cli {
    /// `[logging]` section of the command's configuration file.
    ///
    /// Defaults when the file is missing or unreadable; the command itself
    /// reports those errors.
    pub fn log_settings(&self) -> LogSettings {
        self.command
            .config_path()
            .filter(|path| path.exists())
            .and_then(|path| config_loader::ConfigLoader::load_from_path(path).ok())
            .map(|config| config.logging)
            .unwrap_or_default()
    }

    /// Logging setup from `settings` with command-line flags applied on top.
    ///
    /// The exporter is left to `exchange`, the only command that records
    /// metrics.
    pub fn observability_config(&self, settings: &LogSettings) -> ObservabilityConfig {
        let mut config = ObservabilityConfig::from(settings);
        config.metrics_port = None;

        if let Some(format) = self.log_format {
            config.log_format = format.into();
        }
        if self.quiet {
            config.default_log_level = "warn".to_string();
        } else if self.verbose > 0 {
            config.default_log_level = match self.verbose {
                1 => "debug",
                _ => "trace",
            }
            .to_string();
        }
        config
    }
}

impl Commands {
    /// Configuration file the command reads, if any
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Commands::Validate(args) => Some(&args.config),
            Commands::Info(args) => Some(&args.config),
            Commands::Exchange(args) => args.config.as_deref(),
        }
    }
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "portctl.toml", env = "PORTCTL_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "portctl.toml", env = "PORTCTL_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `exchange` command
#[derive(Parser, Debug, Clone)]
pub struct ExchangeArgs {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, env = "PORTCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of rounds
    #[arg(long, default_value = "3", env = "PORTCTL_ROUNDS")]
    pub rounds: u32,

    /// Pings emitted per round
    #[arg(long, default_value = "1")]
    pub burst: u32,

    /// Override the port buffer capacity (0 = unbounded)
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Metrics server port, overrides configuration (0 = disabled)
    #[arg(long, env = "PORTCTL_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Output report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for contracts::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => contracts::LogFormat::Json,
            LogFormat::Pretty => contracts::LogFormat::Pretty,
            LogFormat::Compact => contracts::LogFormat::Compact,
        }
    }
}
