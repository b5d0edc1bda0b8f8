//! Persistence round-trip and edge case tests.
//!
//! Tests JSON file I/O, settings persistence, and file-backed sessions.

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use crate::kv::FileStore;
use crate::persistence::{ensure_dir, load_json, load_json_or_default, save_json};
use crate::settings_store::{LogLevel, Settings, SettingsStore, TokenStorage};
use crate::token_store::{TOKEN_EXPIRE_KEY, TOKEN_KEY, TokenStore};
use smarthire_core::AppFlavor;

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    save_json(&nested_path, &serde_json::json!({"key": "value"}))
        .await
        .unwrap();

    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/settings.json");

    let result: Result<Settings, _> = load_json(&file_path).await;
    assert!(result.is_err());

    let fallback: Settings = load_json_or_default(&file_path).await;
    assert_eq!(fallback, Settings::default());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("test_dir");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

// ============================================================================
// Settings Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_settings_full_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let settings = Settings {
        api_base_url: "https://api.x.com/api".to_string(),
        app: AppFlavor::Hr,
        login_route: Some("/pages/hr/auth/login?from=expired".to_string()),
        timeout_ms: 5_000,
        token_storage: TokenStorage::Keychain,
        allowed_domains: vec!["api.x.com".to_string()],
        log_level: LogLevel::Debug,
    };

    save_json(&file_path, &settings).await.unwrap();
    let loaded: Settings = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, settings);
}

#[tokio::test]
async fn test_settings_store_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let store = SettingsStore::new(file_path.clone());
    store.update(|s| s.app = AppFlavor::Admin).await;
    store.save().await.unwrap();

    let reloaded = SettingsStore::load(file_path).await.unwrap();
    assert_eq!(reloaded.get().await.app, AppFlavor::Admin);
}

#[tokio::test]
async fn test_base_url_override_is_not_saved() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let store = SettingsStore::new(file_path.clone())
        .with_base_url_override(Some("http://staging.example.com/api".to_string()));
    store.update(|s| s.app = AppFlavor::Hr).await;
    store.save().await.unwrap();

    let raw: Settings = load_json(&file_path).await.unwrap();
    assert_eq!(raw.app, AppFlavor::Hr);
    assert_eq!(raw.api_base_url, crate::settings_store::DEFAULT_BASE_URL);

    let reloaded = SettingsStore::load(file_path).await.unwrap();
    assert_eq!(reloaded.stored().await.app, AppFlavor::Hr);
    assert_eq!(
        reloaded.stored().await.api_base_url,
        crate::settings_store::DEFAULT_BASE_URL
    );
}

#[tokio::test]
async fn test_corrupt_settings_fall_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, "{ not json").await.unwrap();

    let store = SettingsStore::load(file_path).await.unwrap();
    assert_eq!(store.get().await.app, AppFlavor::default());
}

// ============================================================================
// File-backed Session Tests
// ============================================================================

#[tokio::test]
async fn test_file_session_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.json");

    TokenStore::new(Arc::new(FileStore::new(&path)))
        .set("A1", "R1", 3600)
        .await;

    let reopened = TokenStore::new(Arc::new(FileStore::new(&path)));
    assert_eq!(reopened.get().await.as_deref(), Some("A1"));
    assert_eq!(reopened.get_refresh().await.as_deref(), Some("R1"));
    assert!(reopened.is_valid().await);

    let raw: serde_json::Value = load_json(&path).await.unwrap();
    assert_eq!(raw[TOKEN_KEY], "A1");
    assert!(raw[TOKEN_EXPIRE_KEY].as_str().unwrap().parse::<i64>().is_ok());
}

#[tokio::test]
async fn test_file_session_clear_removes_all_keys() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.json");
    let store = Settings::default().token_store_at(&path);

    store.set("A1", "R1", 3600).await;
    store.clear().await;

    let raw: serde_json::Value = load_json(&path).await.unwrap();
    assert_eq!(raw, serde_json::json!({}));
    assert!(store.session().await.is_empty());
}

#[tokio::test]
async fn test_corrupt_session_file_reads_as_logged_out() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.json");
    tokio::fs::write(&path, "garbage").await.unwrap();

    let store = TokenStore::new(Arc::new(FileStore::new(&path)));
    assert_eq!(store.get().await, None);
    assert!(!store.is_valid().await);
}
