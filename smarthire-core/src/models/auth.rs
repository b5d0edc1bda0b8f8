//! Authentication DTOs and the session snapshot.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /user-auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Body of `POST /user-auth/refresh-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// The refresh token to exchange.
    pub refresh_token: String,
}

/// Token triple returned by login and refresh.
///
/// The default value (empty tokens) is what an error envelope without
/// `data` decodes to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Credential used to mint a new access token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Snapshot of the persisted credential state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Bearer credential for API calls.
    pub access_token: Option<String>,
    /// Credential used to mint a new access token.
    pub refresh_token: Option<String>,
    /// Absolute expiry of the access token.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Returns true if an access token is present and unexpired at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(expires_at)) => now < expires_at,
            _ => false,
        }
    }

    /// Returns true if an access token is present and unexpired.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Returns true if any credential is stored.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.expires_at.is_none()
    }

    /// Time left before the access token expires, if it hasn't already.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at
            .map(|expires_at| expires_at - now)
            .filter(|left| *left > Duration::zero())
    }
}
