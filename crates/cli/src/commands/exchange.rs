//! `exchange` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ExchangeArgs;
use crate::error::CliError;
use crate::exchange::{Exchange, ExchangeConfig};

/// Execute the `exchange` command
pub async fn run_exchange(args: &ExchangeArgs) -> Result<()> {
    let runtime = load_runtime(args)?;

    if let Some(port) = runtime.logging.metrics_port {
        observability::init_metrics_only(port)?;
    }

    let mut exchange = Exchange::new(ExchangeConfig {
        runtime,
        rounds: args.rounds,
        burst: args.burst,
    });

    let shutdown_signal = setup_shutdown_signal();

    tokio::select! {
        result = exchange.run() => {
            let report = result.context("Exchange failed")?;
            if args.json {
                let json = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize exchange report")?;
                println!("{}", json);
            } else {
                report.print_summary();
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping exchange...");
        }
    }

    Ok(())
}

/// Load the configuration file if given, then apply CLI overrides
fn load_runtime(args: &ExchangeArgs) -> Result<contracts::RuntimeConfig, CliError> {
    let mut runtime = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()));
            }
            info!(config = %path.display(), "Loading configuration");
            config_loader::ConfigLoader::load_from_path(path)?
        }
        None => contracts::RuntimeConfig::default(),
    };

    if let Some(capacity) = args.capacity {
        info!(capacity, "Overriding port capacity from CLI");
        runtime.port.capacity = (capacity > 0).then_some(capacity);
    }
    if let Some(port) = args.metrics_port {
        runtime.logging.metrics_port = (port > 0).then_some(port);
    }

    config_loader::ConfigLoader::validate(&runtime)?;
    Ok(runtime)
}

/// Resolve on Ctrl+C or SIGTERM
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
