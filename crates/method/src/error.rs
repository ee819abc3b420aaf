//! Dispatch error types

use thiserror::Error;

/// Dispatch errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No implementation applies to the value's type
    #[error("method '{method}' is not implemented for type '{type_name}'")]
    NotImplemented { method: String, type_name: String },

    /// Per-instance registration on a value that has no identity
    #[error("method '{method}' cannot be implemented on a '{type_name}' value without identity")]
    NoIdentity { method: String, type_name: String },

    /// Implementation reported a failure
    #[error("method '{method}' failed: {message}")]
    Failed { method: String, message: String },
}

impl DispatchError {
    /// Create a not-implemented error
    pub fn not_implemented(method: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::NotImplemented {
            method: method.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an implementation failure
    pub fn failed(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Whether this is a not-implemented error
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}
