//! Layered error definitions
//!
//! Categorized by source: config / decode / backend

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Decode Errors =====
    /// Input block could not be decoded
    #[error("decode error ({decoder}): {message}")]
    Decode { decoder: String, message: String },

    // ===== Backend Errors =====
    /// Backend write error
    #[error("backend '{backend}' write error: {message}")]
    BackendWrite { backend: String, message: String },

    /// Backend connection error
    #[error("backend '{backend}' connection error: {message}")]
    BackendConnection { backend: String, message: String },

    /// Write did not finish within the configured timeout
    #[error("backend '{backend}' write timed out after {timeout_ms}ms")]
    WriteTimeout { backend: String, timeout_ms: u64 },

    /// Backend shutdown error
    #[error("backend '{backend}' shutdown error: {message}")]
    BackendShutdown { backend: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create decode error
    pub fn decode(decoder: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            decoder: decoder.into(),
            message: message.into(),
        }
    }

    /// Create backend write error
    pub fn backend_write(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendWrite {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create backend connection error
    pub fn backend_connection(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendConnection {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create backend shutdown error
    pub fn backend_shutdown(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendShutdown {
            backend: backend.into(),
            message: message.into(),
        }
    }
}
