// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # SmartHire Fetch
//!
//! Authenticated HTTP client for the SmartHire backend.
//!
//! Every request goes through the same path:
//!
//! - [`dispatch::Dispatcher`] - URL join, headers, bearer token, envelope decoding
//! - [`retry::AuthRetryPolicy`] - What a 401 means for this request
//! - [`refresh::RefreshCoordinator`] - One refresh at a time, shared by all waiters
//! - [`client::ApiClient`] - The composition callers use
//!
//! ## Host APIs
//!
//! The [`host`] module holds the seams to the outside world:
//!
//! - [`host::Transport`] - Sends bytes; [`host::HttpClient`] is the reqwest implementation
//! - [`host::Navigator`] - Told where to send the user when the session ends
//!
//! ## Example
//!
//! ```ignore
//! use smarthire_fetch::ApiClient;
//! use smarthire_store::SettingsStore;
//!
//! let settings = SettingsStore::load_default().await?.get().await;
//! let client = ApiClient::from_settings(&settings)?;
//!
//! client.login("u1", "p1").await?;
//! let profile: serde_json::Value = client.get("/api/seeker/info").await?;
//! ```

pub mod client;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod refresh;
pub mod retry;
pub mod url_join;

#[cfg(test)]
pub(crate) mod testing;

// Errors
pub use error::{ApiError, RefreshError, TransportError};

// Host APIs
pub use host::{
    HttpClient, LogNavigator, Navigator, Transport, TransportRequest, TransportResponse,
};

// Client
pub use client::{ApiClient, ApiClientBuilder, AuthEndpoints};
pub use dispatch::{Dispatcher, interpret};
pub use refresh::{RefreshCoordinator, RefreshState};
pub use retry::{AuthDecision, AuthRetryPolicy, MAX_AUTH_REPLAYS};
pub use url_join::{API_SEGMENT, join_url, join_url_with_prefix};
