//! Configuration validation
//!
//! Rules:
//! - port.capacity > 0 when set
//! - port.label non-empty when set
//! - scheduler.max_ticks > 0
//! - logging.level non-empty
//! - logging.metrics_port != 0 when set

use contracts::{ContractError, LogSettings, PortConfig, RuntimeConfig, SchedulerConfig};

/// Validate a runtime configuration.
///
/// Returns the first error found.
pub fn validate(config: &RuntimeConfig) -> Result<(), ContractError> {
    validate_port(&config.port)?;
    validate_scheduler(&config.scheduler)?;
    validate_logging(&config.logging)?;
    Ok(())
}

fn validate_port(port: &PortConfig) -> Result<(), ContractError> {
    if port.capacity == Some(0) {
        return Err(ContractError::config_validation(
            "port.capacity",
            "capacity must be > 0 (omit it for an unbounded buffer)",
        ));
    }
    if port.label.as_deref().is_some_and(|label| label.trim().is_empty()) {
        return Err(ContractError::config_validation(
            "port.label",
            "label cannot be empty (omit it for the default label)",
        ));
    }
    Ok(())
}

fn validate_scheduler(scheduler: &SchedulerConfig) -> Result<(), ContractError> {
    if scheduler.max_ticks == 0 {
        return Err(ContractError::config_validation(
            "scheduler.max_ticks",
            "max_ticks must be > 0",
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LogSettings) -> Result<(), ContractError> {
    if logging.level.trim().is_empty() {
        return Err(ContractError::config_validation(
            "logging.level",
            "log level cannot be empty",
        ));
    }
    if logging.metrics_port == Some(0) {
        return Err(ContractError::config_validation(
            "logging.metrics_port",
            "metrics_port must be a non-zero port",
        ));
    }
    Ok(())
}
