//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use smarthire_core::{Session, TokenClaims};
use smarthire_store::Settings;

// ============================================================================
// Output Types
// ============================================================================

/// Session status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutput {
    pub authenticated: bool,
    pub has_access_token: bool,
    pub has_refresh_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_secs: Option<i64>,
    pub app: String,
    pub base_url: String,
}

impl StatusOutput {
    /// Builds the status view. Token values are never included.
    pub fn new(session: &Session, settings: &Settings, now: DateTime<Utc>) -> Self {
        let claims = session
            .access_token
            .as_deref()
            .and_then(|token| TokenClaims::decode(token).ok());

        Self {
            authenticated: session.is_valid_at(now),
            has_access_token: session.access_token.is_some(),
            has_refresh_token: session.refresh_token.is_some(),
            username: claims.as_ref().and_then(|c| c.username.clone()),
            user_id: claims.as_ref().and_then(|c| c.user_id),
            user_type: claims
                .as_ref()
                .and_then(|c| c.user_type)
                .map(|t| t.to_string()),
            expires_at: session.expires_at,
            expires_in_secs: session.remaining_at(now).map(|d| d.num_seconds()),
            app: settings.app.to_string(),
            base_url: settings.api_base_url.clone(),
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
