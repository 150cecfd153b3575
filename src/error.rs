//! Domain-specific error types for drift-auditor

use thiserror::Error;

/// Main error type for the drift auditor
#[derive(Error, Debug)]
pub enum AuditorError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Model error: {message}")]
    Model { message: String },

    #[error("Generation error: {message}")]
    Generation { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for AuditorError {
    fn from(err: anyhow::Error) -> Self {
        AuditorError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AuditorError {
    fn from(err: serde_json::Error) -> Self {
        AuditorError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AuditorError {
    fn from(err: reqwest::Error) -> Self {
        AuditorError::Generation {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<candle_core::Error> for AuditorError {
    fn from(err: candle_core::Error) -> Self {
        AuditorError::Model {
            message: err.to_string(),
        }
    }
}

/// Result type alias for auditor operations
pub type Result<T> = std::result::Result<T, AuditorError>;
