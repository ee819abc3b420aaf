//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::RuntimeConfig;
use tracing::info;

use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let json = config_loader::ConfigLoader::to_json(&config)
            .context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn print_config_info(config: &RuntimeConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Port Runtime Configuration                 ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🔌 Port");
    match config.port.capacity {
        Some(capacity) => println!("   └─ Capacity: {} events", capacity),
        None => println!("   └─ Capacity: unbounded"),
    }

    println!("\n⚙️  Scheduler");
    println!("   └─ Max ticks per run: {}", config.scheduler.max_ticks);

    println!("\n📝 Logging");
    println!("   ├─ Level: {}", config.logging.level);
    println!("   ├─ Format: {:?}", config.logging.format);
    match config.logging.metrics_port {
        Some(port) => println!("   └─ Metrics: 0.0.0.0:{}", port),
        None => println!("   └─ Metrics: disabled"),
    }

    println!();
}
