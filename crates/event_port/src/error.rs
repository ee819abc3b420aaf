//! Port and scheduler error types

use event_core::EventError;
use thiserror::Error;

/// Port operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// The port was destroyed
    #[error("port is destroyed")]
    Destroyed,

    /// Buffer full, event rejected
    #[error("port buffer full (capacity {capacity}), event rejected")]
    Overflow { capacity: usize },

    /// A target listener failed and nothing handled it
    #[error("delivery failed: {0}")]
    Delivery(#[from] EventError),
}

impl PortError {
    /// Whether this is an overflow rejection
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow { .. })
    }
}

/// Scheduler errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Tasks kept deferring new tasks past the tick budget
    #[error("scheduler still busy after {ticks} ticks")]
    TickBudgetExhausted { ticks: usize },
}
