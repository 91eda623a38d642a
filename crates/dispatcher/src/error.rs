//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Backend creation error
    #[error("failed to create backend '{name}': {message}")]
    BackendCreation { name: String, message: String },

    /// Admission gate closed while waiting for a slot
    #[error("admission gate closed")]
    GateClosed,

    /// Asked to drain more outcomes than are pending
    #[error("cannot drain {requested} outcomes, only {pending} pending")]
    DrainOverrun { requested: usize, pending: usize },

    /// Backend or decode error (from contract)
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a backend creation error
    pub fn backend_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
