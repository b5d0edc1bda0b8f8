// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # SmartHire Store
//!
//! Session persistence and client settings.
//!
//! This crate provides:
//!
//! - **TokenStore**: The persisted access/refresh/expiry triple with a
//!   validity check
//! - **KeyValueStore**: Pluggable backends (memory, JSON file, OS keychain)
//! - **SettingsStore**: Client configuration with persistence
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use smarthire_store::{SettingsStore, TokenStore};
//!
//! let settings = SettingsStore::load_default().await?.get().await;
//! let tokens: TokenStore = settings.token_store();
//!
//! tokens.set("access", "refresh", 3600).await;
//! assert!(tokens.is_valid().await);
//! ```

pub mod error;
pub mod kv;
pub mod persistence;
pub mod settings_store;
pub mod token_store;

pub use error::StoreError;
pub use kv::{FileStore, KeyValueStore, KeychainStore, MemoryStore};
pub use persistence::{
    default_config_dir, default_session_path, default_settings_path, ensure_dir, load_json,
    load_json_or_default, save_json,
};
pub use settings_store::{
    BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, LogLevel, Settings, SettingsStore,
    TokenStorage, base_url_from_env,
};
pub use token_store::{
    MAX_EXPIRES_IN_SECS, REFRESH_TOKEN_KEY, TOKEN_EXPIRE_KEY, TOKEN_KEY, TokenStore,
};
#[cfg(test)]
mod persistence_tests;
