//! Key-value persistence backends for session state.
//!
//! The token store only needs three string keys, so every backend exposes
//! the same small surface. Multi-key writes and removals go through a single
//! call so a backend can apply them together.
//!
//! - [`MemoryStore`] - In-process map
//! - [`FileStore`] - JSON object file with owner-only permissions
//! - [`KeychainStore`] - OS keychain, one entry per key

mod file;
mod keychain;
mod memory;

pub use file::FileStore;
pub use keychain::KeychainStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Key present
    /// * `Ok(None)` - Key absent
    /// * `Err(e)` - Backend failure
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes several entries in one operation.
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError>;

    /// Removes several keys in one operation. Missing keys are not an error.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;
}
