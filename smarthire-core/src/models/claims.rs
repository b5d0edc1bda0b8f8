//! Access token claim decoding.
//!
//! The backend signs HS256 JWTs whose payload nests the user under a
//! `claims` object:
//!
//! ```json
//! { "claims": { "id": 42, "username": "alice", "userType": 2 }, "exp": 1735000000 }
//! ```
//!
//! Decoding here is for display only. The signature is NOT verified; the
//! server remains the authority on whether a token is acceptable.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Account role encoded in the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    /// Job seeker (1).
    Seeker,
    /// HR / recruiter (2).
    Hr,
    /// Platform administrator (3).
    Admin,
    /// Unrecognized role code.
    Other(i64),
}

impl UserType {
    /// Maps a backend role code.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => UserType::Seeker,
            2 => UserType::Hr,
            3 => UserType::Admin,
            other => UserType::Other(other),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::Seeker => write!(f, "seeker"),
            UserType::Hr => write!(f, "hr"),
            UserType::Admin => write!(f, "admin"),
            UserType::Other(code) => write!(f, "unknown({code})"),
        }
    }
}

/// Raw payload layout.
#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    claims: Option<RawClaims>,
    #[serde(default)]
    exp: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClaims {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    user_type: Option<i64>,
}

/// User information carried in an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// User ID.
    pub user_id: Option<i64>,
    /// Account name.
    pub username: Option<String>,
    /// Account role.
    pub user_type: Option<UserType>,
    /// Token `exp` claim.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenClaims {
    /// Decodes the payload segment of a JWT without verifying it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidToken`] if the token is not three
    /// dot-separated segments, the payload is not base64url, or it is not
    /// a JSON object.
    pub fn decode(token: &str) -> Result<Self, CoreError> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => {
                return Err(CoreError::InvalidToken(
                    "expected three dot-separated segments".to_string(),
                ));
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| CoreError::InvalidToken(format!("payload is not base64url: {e}")))?;

        let raw: RawPayload = serde_json::from_slice(&bytes)
            .map_err(|e| CoreError::InvalidToken(format!("payload is not JSON: {e}")))?;

        let claims = raw.claims.unwrap_or(RawClaims {
            id: None,
            username: None,
            user_type: None,
        });

        Ok(Self {
            user_id: claims.id,
            username: claims.username,
            user_type: claims.user_type.map(UserType::from_code),
            expires_at: raw.exp.and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        })
    }
}
