//! Error types for CLI operations.

use contracts::ContractError;
use event_port::{PortError, SchedulerError};
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration loading or validation error
    #[error("Invalid configuration: {0}")]
    Config(#[from] ContractError),

    /// Port operation failed
    #[error("Port error: {0}")]
    Port(#[from] PortError),

    /// Scheduler did not settle
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
