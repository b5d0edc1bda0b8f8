//! Request dispatch.
//!
//! Turns an [`ApiRequest`] into a wire request (URL join, headers, bearer
//! token), sends it, and maps the response envelope onto
//! `Result<Value, ApiError>`. Never touches the token store beyond reading
//! the access token.

use serde_json::Value;
use smarthire_core::{ApiRequest, ApiResponse};
use smarthire_store::TokenStore;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::ApiError;
use crate::host::{Transport, TransportRequest, TransportResponse};
use crate::url_join::join_url;

const CONTENT_TYPE: &str = "Content-Type";
const AUTHORIZATION: &str = "Authorization";
const JSON: &str = "application/json";

/// Sends single requests. One call in, one transport call out.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    base_url: String,
    default_timeout: Option<Duration>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher.
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: TokenStore,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            tokens,
            base_url: base_url.into(),
            default_timeout: None,
        }
    }

    /// Sets the timeout used when a request carries none.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the token store.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Resolves the wire request for `request`, reading the current token.
    pub async fn prepare(&self, request: &ApiRequest) -> TransportRequest {
        let mut headers: Vec<(String, String)> = Vec::new();

        let multipart = request.data.as_ref().is_some_and(|d| d.is_multipart());
        if !multipart {
            set_header(&mut headers, CONTENT_TYPE, JSON);
        }
        for (name, value) in &request.headers {
            set_header(&mut headers, name, value);
        }

        if !request.skip_auth {
            if let Some(token) = self.tokens.get().await {
                set_header(&mut headers, AUTHORIZATION, &format!("Bearer {token}"));
            }
        }

        TransportRequest {
            method: request.method,
            url: join_url(&self.base_url, &request.url),
            headers,
            body: request.data.clone(),
            timeout: request.timeout.or(self.default_timeout),
        }
    }

    /// Sends `request` once and interprets the envelope.
    ///
    /// # Errors
    ///
    /// See [`interpret`]; transport failures map to [`ApiError::Network`]
    /// (or the URL/allowlist variants).
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path()))]
    pub async fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let wire = self.prepare(request).await;
        debug!(url = %wire.url, auth = wire.header(AUTHORIZATION).is_some(), "Dispatching");

        let response = self.transport.send(wire).await.map_err(|e| {
            warn!(error = %e, "Request failed without a response");
            ApiError::from(e)
        })?;

        interpret(&response)
    }
}

/// Replaces any header named `name` (case-insensitive) with `value`.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.to_string()));
}

/// Maps a response's status and body onto the envelope outcome.
///
/// # Errors
///
/// - 2xx with a non-zero code: [`ApiError::Application`]
/// - 2xx with a body that is not an envelope: [`ApiError::InvalidResponse`]
/// - anything else: [`ApiError::HttpStatus`] with whatever envelope fields parsed
pub fn interpret(response: &TransportResponse) -> Result<Value, ApiError> {
    let TransportResponse { status, body } = response;
    let status = *status;

    if response.is_success() {
        let envelope: ApiResponse<Value> = serde_json::from_slice(body)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        if envelope.is_success() {
            return Ok(envelope.data);
        }
        debug!(code = envelope.code, message = %envelope.message, "Application error");
        return Err(ApiError::Application {
            code: envelope.code,
            message: envelope.message,
            data: envelope.data,
        });
    }

    let envelope = serde_json::from_slice::<ApiResponse<Value>>(body).ok();
    debug!(status, parsed = envelope.is_some(), "HTTP error status");
    Err(match envelope {
        Some(env) => ApiError::HttpStatus {
            status,
            code: Some(env.code),
            message: Some(env.message).filter(|m| !m.is_empty()),
            data: Some(env.data).filter(|d| !d.is_null()),
        },
        None => ApiError::HttpStatus {
            status,
            code: None,
            message: None,
            data: None,
        },
    })
}
