//! Transport seam.
//!
//! Everything above this trait deals in [`ApiRequest`](smarthire_core::ApiRequest)
//! and envelopes; everything below it deals in bytes on the wire. Tests
//! substitute an in-process implementation.

use async_trait::async_trait;
use smarthire_core::{HttpMethod, Payload};
use std::time::Duration;

use crate::error::TransportError;

/// A fully resolved outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// Final header set, in order.
    pub headers: Vec<(String, String)>,
    /// Payload. For GET/DELETE a JSON object is sent as query parameters.
    pub body: Option<Payload>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Returns the first header value matching `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests over the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns whatever the server answered.
    ///
    /// Only failures that produce no HTTP response are errors; any status
    /// code is returned as a [`TransportResponse`].
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
