//! Client settings store.
//!
//! Holds everything the client needs to talk to a backend: base URL, which
//! app it acts as, where sessions are kept, and request defaults.

use serde::{Deserialize, Serialize};
use smarthire_core::AppFlavor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::kv::{FileStore, KeyValueStore, KeychainStore, MemoryStore};
use crate::persistence::{default_session_path, default_settings_path, load_json, save_json};
use crate::token_store::TokenStore;

/// Environment variable that overrides the configured base URL.
pub const BASE_URL_ENV: &str = "SMARTHIRE_API_BASE_URL";

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/smarthire/api";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Reads the base URL override from [`BASE_URL_ENV`], ignoring blank values.
pub fn base_url_from_env() -> Option<String> {
    std::env::var(BASE_URL_ENV)
        .ok()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

// ============================================================================
// Settings Types
// ============================================================================

/// Client preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL (may end with an `/api` segment).
    pub api_base_url: String,

    /// App this client acts as.
    pub app: AppFlavor,

    /// Login route override; the app's default route when `None`.
    pub login_route: Option<String>,

    /// Default request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Where session tokens are persisted.
    pub token_storage: TokenStorage,

    /// Hosts requests may target (empty = unrestricted).
    pub allowed_domains: Vec<String>,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            app: AppFlavor::default(),
            login_route: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            token_storage: TokenStorage::default(),
            allowed_domains: Vec::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Effective login route.
    pub fn login_route(&self) -> &str {
        self.login_route
            .as_deref()
            .unwrap_or_else(|| self.app.login_route())
    }

    /// Default request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Opens the token store selected by `token_storage`.
    pub fn token_store(&self) -> TokenStore {
        self.token_store_at(default_session_path())
    }

    /// Opens the token store, using `session_path` for file storage.
    pub fn token_store_at(&self, session_path: impl Into<PathBuf>) -> TokenStore {
        let backend: Arc<dyn KeyValueStore> = match self.token_storage {
            TokenStorage::File => Arc::new(FileStore::new(session_path)),
            TokenStorage::Keychain => Arc::new(KeychainStore::new(self.app)),
            TokenStorage::Memory => Arc::new(MemoryStore::new()),
        };
        TokenStore::new(backend)
    }
}

/// Session persistence backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenStorage {
    /// JSON file in the config directory.
    #[default]
    File,
    /// OS keychain.
    Keychain,
    /// In-memory only; sessions end with the process.
    Memory,
}

impl std::fmt::Display for TokenStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStorage::File => write!(f, "file"),
            TokenStorage::Keychain => write!(f, "keychain"),
            TokenStorage::Memory => write!(f, "memory"),
        }
    }
}

/// Default verbosity for the `smarthire` log target.
///
/// `RUST_LOG` still wins when it is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    #[default]
    Warn,
    /// Session events.
    Info,
    /// Requests and refresh decisions.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// The matching `tracing` level.
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }

    /// `EnvFilter` directive scoping this level to the `smarthire` crates.
    pub fn filter_directive(self) -> String {
        format!("smarthire={}", self.as_tracing().as_str().to_ascii_lowercase())
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_tracing().as_str().to_ascii_lowercase())
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings with file persistence.
///
/// The base URL override is layered on top of the file-backed settings by
/// [`get`](Self::get) and never reaches [`save`](Self::save).
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    base_url_override: Option<String>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store holding defaults, saved to `path` on [`save`](Self::save).
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            base_url_override: None,
            path,
        }
    }

    /// Replaces the base URL override.
    #[must_use]
    pub fn with_base_url_override(mut self, url: Option<String>) -> Self {
        self.base_url_override = url;
        self
    }

    /// The active base URL override, if any.
    pub fn base_url_override(&self) -> Option<&str> {
        self.base_url_override.as_deref()
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if the settings path cannot be inspected.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path. A missing or unreadable file yields
    /// defaults. [`BASE_URL_ENV`] becomes the base URL override.
    ///
    /// # Errors
    ///
    /// Returns error if the settings path cannot be inspected.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = if tokio::fs::try_exists(&path).await? {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };
        let base_url_override = base_url_from_env();
        if base_url_override.is_some() {
            debug!(env = BASE_URL_ENV, "Base URL overridden from environment");
        }

        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            base_url_override,
            path,
        })
    }

    /// Gets a copy of the effective settings, override applied.
    pub async fn get(&self) -> Settings {
        let mut settings = self.stored().await;
        if let Some(url) = &self.base_url_override {
            settings.api_base_url.clone_from(url);
        }
        settings
    }

    /// Gets a copy of the settings as they are saved to disk.
    pub async fn stored(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Saves the file-backed settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL is not absolute http(s).
    pub async fn set_base_url(&self, url: &str) -> Result<(), StoreError> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "base URL must start with http:// or https://: {url}"
            )));
        }
        let url = url.to_string();
        self.update(|s| s.api_base_url = url).await;
        Ok(())
    }

    /// Resets all settings to defaults.
    pub async fn reset(&self) {
        self.update(|s| *s = Settings::default()).await;
    }
}
