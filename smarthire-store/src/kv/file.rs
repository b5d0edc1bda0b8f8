//! JSON file backend.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::KeyValueStore;
use crate::error::StoreError;
use crate::persistence::{default_session_path, load_json, save_json};

type Entries = BTreeMap<String, String>;

/// Stores all keys in one JSON object file.
///
/// Writes replace the whole file atomically, so a crash mid-write leaves the
/// previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates a store at the default session path.
    pub fn at_default_path() -> Self {
        Self::new(default_session_path())
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries, StoreError> {
        match load_json(&self.path).await {
            Ok(entries) => Ok(entries),
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Entries::new())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    #[instrument(skip(self, entries), fields(path = %self.path.display(), count = entries.len()))]
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut current = self.read_entries().await?;
        for (key, value) in entries {
            current.insert((*key).to_string(), (*value).to_string());
        }
        save_json(&self.path, &current).await
    }

    #[instrument(skip(self, keys), fields(path = %self.path.display()))]
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut current = self.read_entries().await?;
        let before = current.len();
        for key in keys {
            current.remove(*key);
        }
        if current.len() == before {
            debug!("No keys to remove");
            return Ok(());
        }
        save_json(&self.path, &current).await
    }
}
