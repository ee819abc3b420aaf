//! Runtime configuration contracts shared across crates.
//!
//! Every section is optional in configuration files and falls back to
//! its default.

use serde::{Deserialize, Serialize};

/// Top-level runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Port defaults
    #[serde(default)]
    pub port: PortConfig,

    /// Cooperative scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LogSettings,
}

/// Port configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    /// Maximum number of buffered events (None = unbounded)
    #[serde(default)]
    pub capacity: Option<usize>,

    /// Metrics label (None = the shared `DEFAULT_PORT_LABEL`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Metrics label of ports configured without one
pub const DEFAULT_PORT_LABEL: &str = "port";

impl PortConfig {
    /// Bounded port configuration
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            label: None,
        }
    }

    /// Same configuration under the metrics label `label`
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label ports report their metrics under
    pub fn metrics_label(&self) -> &str {
        self.label.as_deref().unwrap_or(DEFAULT_PORT_LABEL)
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum ticks a single `run_until_idle` / `drive` may take
    #[serde(default = "default_max_ticks")]
    pub max_ticks: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
        }
    }
}

fn default_max_ticks() -> usize {
    10_000
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Default level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Prometheus exporter port (None = disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
