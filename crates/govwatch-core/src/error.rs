//! Error types for GovWatch

use thiserror::Error;

/// Result type alias using GovWatch's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for GovWatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// Metrics provider was unavailable; the cycle is skipped and retried
    /// on the next timer tick
    #[error("Metrics provider error: {0}")]
    Provider(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
