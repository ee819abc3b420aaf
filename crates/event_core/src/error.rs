//! Event core error types

use thiserror::Error;

/// Failure raised by a listener
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    /// Create a listener error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<EventError> for ListenerError {
    fn from(err: EventError) -> Self {
        Self::new(err.to_string())
    }
}

/// Emission errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A listener failed and nothing handled the `error` event
    #[error("listener for '{event}' failed: {source}")]
    Listener {
        event: String,
        #[source]
        source: ListenerError,
    },
}

impl EventError {
    /// Create a listener failure
    pub fn listener(event: impl Into<String>, source: ListenerError) -> Self {
        Self::Listener {
            event: event.into(),
            source,
        }
    }
}
