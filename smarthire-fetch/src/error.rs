//! Client error types.

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Api Error
// ============================================================================

/// Error returned to callers of the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response (DNS, connect, TLS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP status outside 2xx that was not recovered.
    #[error("Request failed with status {status}{}", fmt_message(.message.as_deref()))]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Envelope code, if the body parsed.
        code: Option<i64>,
        /// Envelope message, if the body parsed.
        message: Option<String>,
        /// Envelope data, if the body parsed.
        data: Option<Value>,
    },

    /// HTTP 2xx with a non-zero envelope code.
    #[error("API error {code}: {message}")]
    Application {
        /// Envelope code.
        code: i64,
        /// Envelope message.
        message: String,
        /// Partial payload, if any.
        data: Value,
    },

    /// Authentication could not be recovered. The session has been cleared
    /// and the login redirect issued.
    #[error("Unauthorized: {reason}")]
    Unauthorized {
        /// Why the session ended.
        reason: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request payload could not be encoded.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The target host is not in the allowlist.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),
}

fn fmt_message(message: Option<&str>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(": {m}"),
        _ => String::new(),
    }
}

impl ApiError {
    /// HTTP status, for [`ApiError::HttpStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Envelope code, when the server sent one.
    pub fn code(&self) -> Option<i64> {
        match self {
            ApiError::HttpStatus { code, .. } => *code,
            ApiError::Application { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true for an HTTP 401 response.
    pub fn is_http_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Returns true for [`ApiError::Unauthorized`].
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => ApiError::Network("request timed out".to_string()),
            TransportError::Network(msg) => ApiError::Network(msg),
            TransportError::InvalidUrl(msg) => ApiError::InvalidUrl(msg),
            TransportError::DomainNotAllowed(host) => ApiError::DomainNotAllowed(host),
            TransportError::Body(msg) => ApiError::InvalidRequest(msg),
        }
    }
}

// ============================================================================
// Transport Error
// ============================================================================

/// Failure below the HTTP layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS, or TLS failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Request body could not be built.
    #[error("Invalid body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_builder() {
            TransportError::InvalidUrl(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

// ============================================================================
// Refresh Error
// ============================================================================

/// Why a token refresh failed.
///
/// `Clone` so one outcome can be handed to every waiter of a shared refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// No refresh token is stored.
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// The server answered with a non-zero envelope code.
    #[error("Refresh rejected ({code}): {message}")]
    Rejected {
        /// Envelope code.
        code: i64,
        /// Envelope message.
        message: String,
    },

    /// The server answered with a non-2xx status.
    #[error("Token refresh failed with status {0}")]
    Status(u16),

    /// No response.
    #[error("Network error during refresh: {0}")]
    Network(String),

    /// The response could not be decoded into tokens.
    #[error("Invalid refresh response: {0}")]
    InvalidResponse(String),
}

impl From<ApiError> for RefreshError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => RefreshError::Network(msg),
            ApiError::HttpStatus { status, .. } => RefreshError::Status(status),
            ApiError::Application { code, message, .. } => RefreshError::Rejected { code, message },
            other => RefreshError::InvalidResponse(other.to_string()),
        }
    }
}
