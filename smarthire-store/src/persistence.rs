//! JSON file persistence.
//!
//! Both the settings file and the file-backed session go through
//! [`save_json`]. The session file holds bearer credentials, so every file
//! written here is owner-only on Unix and every directory created here is
//! owner-only too.

use serde::{Serialize, de::DeserializeOwned};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

const APP_DIR: &str = "smarthire";
const FILE_MODE: u32 = 0o600;
const DIR_MODE: u32 = 0o700;

/// Returns the platform config directory joined with `smarthire`.
///
/// Falls back to the working directory when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir().map_or_else(|| PathBuf::from("."), |dir| dir.join(APP_DIR))
}

/// `<config dir>/settings.json`
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

/// `<config dir>/session.json`
pub fn default_session_path() -> PathBuf {
    default_config_dir().join("session.json")
}

#[cfg(unix)]
async fn restrict(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    debug!(path = %path.display(), mode = %format!("{mode:o}"), "Restricted permissions");
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn restrict(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}

/// Writes `bytes` next to `path` and renames over it, so readers see the
/// old file or the new one and never a partial write.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let staging = path.with_extension("json.tmp");

    tokio::fs::write(&staging, bytes).await?;
    restrict(&staging, FILE_MODE).await?;
    if let Err(e) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e.into());
    }
    Ok(())
}

/// Serializes `data` as pretty JSON and writes it atomically.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be written and
/// [`StoreError::Serialization`] if `data` does not serialize.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }

    let json = serde_json::to_vec_pretty(data)?;
    write_atomic(path, &json).await?;

    debug!(path = %path.display(), bytes = json.len(), "Saved JSON file");
    Ok(())
}

/// Reads and parses a JSON file.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read (including
/// `NotFound`) and [`StoreError::Serialization`] if it does not parse.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&content)?)
}

/// Like [`load_json`], but a missing or broken file yields `T::default()`.
///
/// Only the broken case is logged.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => T::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable JSON file, using defaults");
            T::default()
        }
    }
}

/// Creates `path` (owner-only) if it does not exist yet.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the directory cannot be created.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if tokio::fs::try_exists(path).await? {
        return Ok(());
    }

    tokio::fs::create_dir_all(path).await?;
    restrict(path, DIR_MODE).await
}
