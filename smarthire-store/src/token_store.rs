//! Session token storage.
//!
//! Persists the access token, refresh token, and access token expiry under
//! three keys that are always written and cleared together:
//!
//! | Key | Value |
//! |-----|-------|
//! | `auth_token` | access token |
//! | `auth_refresh_token` | refresh token |
//! | `auth_token_expire` | expiry, epoch milliseconds as a string |
//!
//! Backend failures never reach callers: reads degrade to "absent" and
//! writes are logged, so a broken store behaves like a logged-out session.

use chrono::{DateTime, TimeZone, Utc};
use smarthire_core::{AuthTokens, Session};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::kv::{KeyValueStore, MemoryStore};

/// Access token key.
pub const TOKEN_KEY: &str = "auth_token";

/// Refresh token key.
pub const REFRESH_TOKEN_KEY: &str = "auth_refresh_token";

/// Longest access token lifetime honored by [`TokenStore::set`] (ten years).
pub const MAX_EXPIRES_IN_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Access token expiry key (epoch milliseconds).
pub const TOKEN_EXPIRE_KEY: &str = "auth_token_expire";

const ALL_KEYS: [&str; 3] = [TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRE_KEY];

/// Handle to the persisted session.
///
/// Cheap to clone; clones share the backend and the write lock. Multi-key
/// writes hold the lock exclusively so readers in this process never observe
/// a half-written session.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
    lock: Arc<RwLock<()>>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    /// Creates a token store over `backend`.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            lock: Arc::new(RwLock::new(())),
        }
    }

    /// Creates a token store over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Returns the stored access token.
    pub async fn get(&self) -> Option<String> {
        let _guard = self.lock.read().await;
        self.read(TOKEN_KEY).await
    }

    /// Returns the stored refresh token.
    pub async fn get_refresh(&self) -> Option<String> {
        let _guard = self.lock.read().await;
        self.read(REFRESH_TOKEN_KEY).await
    }

    /// Returns the stored access token expiry, if present and parseable.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        let _guard = self.lock.read().await;
        self.read_expiry().await
    }

    /// Returns true if an access token is stored and has not expired.
    pub async fn is_valid(&self) -> bool {
        self.session().await.is_valid()
    }

    /// Returns a consistent snapshot of all three fields.
    pub async fn session(&self) -> Session {
        let _guard = self.lock.read().await;
        Session {
            access_token: self.read(TOKEN_KEY).await,
            refresh_token: self.read(REFRESH_TOKEN_KEY).await,
            expires_at: self.read_expiry().await,
        }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Stores a new token triple. The access token expires
    /// `expires_in_secs` seconds from now, clamped to
    /// `0..=`[`MAX_EXPIRES_IN_SECS`].
    #[instrument(skip(self, access_token, refresh_token))]
    pub async fn set(&self, access_token: &str, refresh_token: &str, expires_in_secs: i64) {
        let lifetime_ms = expires_in_secs.clamp(0, MAX_EXPIRES_IN_SECS) * 1000;
        let expires_at = Utc::now().timestamp_millis().saturating_add(lifetime_ms);
        let expires_at = expires_at.to_string();

        let _guard = self.lock.write().await;
        match self
            .backend
            .set_many(&[
                (TOKEN_KEY, access_token),
                (REFRESH_TOKEN_KEY, refresh_token),
                (TOKEN_EXPIRE_KEY, &expires_at),
            ])
            .await
        {
            Ok(()) => debug!("Session tokens stored"),
            Err(e) => warn!(error = %e, "Failed to store session tokens"),
        }
    }

    /// Stores the triple returned by login or refresh.
    pub async fn set_tokens(&self, tokens: &AuthTokens) {
        self.set(&tokens.access_token, &tokens.refresh_token, tokens.expires_in)
            .await;
    }

    /// Removes all session fields. Idempotent; failures are logged.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        let _guard = self.lock.write().await;
        match self.backend.remove_many(&ALL_KEYS).await {
            Ok(()) => debug!("Session tokens cleared"),
            Err(e) => warn!(error = %e, "Failed to clear session tokens"),
        }
    }

    // ========================================================================
    // Helpers (caller holds the lock)
    // ========================================================================

    async fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read session field, treating as absent");
                None
            }
        }
    }

    async fn read_expiry(&self) -> Option<DateTime<Utc>> {
        let raw = self.read(TOKEN_EXPIRE_KEY).await?;
        let millis = raw.trim().parse::<i64>().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use async_trait::async_trait;

    /// Backend that fails every operation.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("broken".to_string()))
        }

        async fn set_many(&self, _entries: &[(&str, &str)]) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("broken".to_string()))
        }

        async fn remove_many(&self, _keys: &[&str]) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("broken".to_string()))
        }
    }

    async fn store_with_expiry(expires_at_ms: i64) -> TokenStore {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set_many(&[
                (TOKEN_KEY, "A1"),
                (REFRESH_TOKEN_KEY, "R1"),
                (TOKEN_EXPIRE_KEY, &expires_at_ms.to_string()),
            ])
            .await
            .unwrap();
        TokenStore::new(backend)
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = TokenStore::in_memory();
        store.set("A1", "R1", 3600).await;

        assert_eq!(store.get().await.as_deref(), Some("A1"));
        assert_eq!(store.get_refresh().await.as_deref(), Some("R1"));
        assert!(store.is_valid().await);

        let expires_at = store.expires_at().await.unwrap();
        let delta = expires_at - Utc::now();
        assert!(delta > chrono::Duration::seconds(3590));
        assert!(delta <= chrono::Duration::seconds(3600));
    }

    #[tokio::test]
    async fn test_huge_lifetime_is_clamped() {
        let store = TokenStore::in_memory();
        store.set("A1", "R1", i64::MAX / 1000).await;

        assert!(store.is_valid().await);
        let expires_at = store.expires_at().await.unwrap();
        let ceiling = Utc::now() + chrono::Duration::seconds(MAX_EXPIRES_IN_SECS);
        assert!(expires_at <= ceiling);
    }

    #[tokio::test]
    async fn test_negative_lifetime_is_already_expired() {
        let store = TokenStore::in_memory();
        store.set("A1", "R1", i64::MIN).await;

        assert!(!store.is_valid().await);
        assert_eq!(store.get().await.as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn test_expired_one_millisecond_ago_is_invalid() {
        let store = store_with_expiry(Utc::now().timestamp_millis() - 1).await;
        assert!(!store.is_valid().await);
        assert_eq!(store.get().await.as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn test_expiring_in_one_second_is_valid() {
        let store = store_with_expiry(Utc::now().timestamp_millis() + 1000).await;
        assert!(store.is_valid().await);
    }

    #[tokio::test]
    async fn test_unparseable_expiry_is_invalid() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set_many(&[(TOKEN_KEY, "A1"), (TOKEN_EXPIRE_KEY, "soon")])
            .await
            .unwrap();
        let store = TokenStore::new(backend);

        assert!(!store.is_valid().await);
        assert_eq!(store.expires_at().await, None);
    }

    #[tokio::test]
    async fn test_missing_expiry_is_invalid() {
        let backend = Arc::new(MemoryStore::new());
        backend.set_many(&[(TOKEN_KEY, "A1")]).await.unwrap();
        assert!(!TokenStore::new(backend).is_valid().await);
    }

    #[tokio::test]
    async fn test_empty_values_read_as_absent() {
        let backend = Arc::new(MemoryStore::new());
        backend.set_many(&[(TOKEN_KEY, "")]).await.unwrap();
        assert_eq!(TokenStore::new(backend).get().await, None);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = TokenStore::in_memory();
        store.set("A1", "R1", 3600).await;

        store.clear().await;
        store.clear().await;

        assert_eq!(store.get().await, None);
        assert_eq!(store.get_refresh().await, None);
        assert_eq!(store.expires_at().await, None);
        assert!(store.session().await.is_empty());
    }

    #[tokio::test]
    async fn test_broken_backend_degrades_to_logged_out() {
        let store = TokenStore::new(Arc::new(BrokenStore));

        store.set("A1", "R1", 3600).await;
        assert_eq!(store.get().await, None);
        assert_eq!(store.get_refresh().await, None);
        assert!(!store.is_valid().await);

        store.clear().await;
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = TokenStore::in_memory();
        let other = store.clone();

        store
            .set_tokens(&AuthTokens {
                access_token: "A2".to_string(),
                refresh_token: "R2".to_string(),
                expires_in: 60,
            })
            .await;

        assert_eq!(other.get().await.as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_whole_writes() {
        let store = TokenStore::in_memory();
        store.set("A0", "R0", 3600).await;

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 1..50 {
                    store.set(&format!("A{i}"), &format!("R{i}"), 3600).await;
                }
            })
        };

        for _ in 0..50 {
            let session = store.session().await;
            let access = session.access_token.unwrap();
            let refresh = session.refresh_token.unwrap();
            assert_eq!(access[1..], refresh[1..]);
        }

        writer.await.unwrap();
    }
}
