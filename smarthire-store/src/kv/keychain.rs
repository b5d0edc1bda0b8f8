//! OS keychain backend.
//!
//! Uses the `keyring` crate, which provides cross-platform access to:
//! - macOS Keychain Services
//! - Windows Credential Manager
//! - Linux Secret Service API

use async_trait::async_trait;
use keyring::Entry;
use smarthire_core::AppFlavor;
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::StoreError;

/// Service name prefix for SmartHire credentials.
const SERVICE_PREFIX: &str = "smarthire";

/// Stores each key as its own keychain entry under one service.
///
/// The keychain has no multi-entry transaction, so `set_many` writes entries
/// in order and stops at the first failure.
#[derive(Debug, Clone)]
pub struct KeychainStore {
    service: String,
}

impl KeychainStore {
    /// Creates a store under `smarthire:<app>`.
    pub fn new(app: AppFlavor) -> Self {
        Self {
            service: Self::full_service(app.id()),
        }
    }

    /// Builds the full service name with prefix.
    fn full_service(name: &str) -> String {
        format!("{SERVICE_PREFIX}:{name}")
    }

    /// Returns the keychain service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<Entry, StoreError> {
        Entry::new(&self.service, key).map_err(StoreError::from)
    }
}

#[async_trait]
impl KeyValueStore for KeychainStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => {
                warn!(service = %self.service, key = %key, error = %e, "Failed to read keychain entry");
                Err(e.into())
            }
        }
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.entry(key)?.set_password(value).map_err(|e| {
                warn!(service = %self.service, key = %key, error = %e, "Failed to write keychain entry");
                StoreError::from(e)
            })?;
        }
        debug!(service = %self.service, count = entries.len(), "Keychain entries stored");
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut first_error = None;
        for key in keys {
            match self.entry(key)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => {
                    warn!(service = %self.service, key = %key, error = %e, "Failed to delete keychain entry");
                    first_error.get_or_insert(StoreError::from(e));
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
