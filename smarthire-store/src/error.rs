//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Keychain error.
    #[error("Keychain error: {0}")]
    Keychain(String),

    /// Backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<keyring::Error> for StoreError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoStorageAccess(e) => StoreError::Unavailable(e.to_string()),
            keyring::Error::PlatformFailure(e) => StoreError::Keychain(e.to_string()),
            other => StoreError::Keychain(other.to_string()),
        }
    }
}
