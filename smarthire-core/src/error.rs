//! Core error types for SmartHire.

use thiserror::Error;

/// Core error type for SmartHire model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An access token could not be decoded.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Unknown HTTP method name.
    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// Unknown app flavor name.
    #[error("Unknown app: {0}")]
    UnknownApp(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
