//! # portctl
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration validation and inspection
//! - A scheduler-driven exchange between two connected ports

mod cli;
mod commands;
mod error;
mod exchange;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_exchange, run_info, run_validate};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "portctl starting");

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
        Commands::Exchange(args) => run_exchange(args).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging from the configuration's `[logging]` section, with
/// CLI options taking precedence
fn init_logging(cli: &Cli) -> Result<()> {
    let settings = cli.log_settings();
    observability::init_with_config(cli.observability_config(&settings))
}
