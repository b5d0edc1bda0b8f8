//! reqwest-backed transport with tracing and a domain allowlist.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde_json::Value;
use smarthire_core::{HttpMethod, MultipartForm, Payload};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::transport::{Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// User agent string for SmartHire clients.
const USER_AGENT: &str = concat!("SmartHire/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP transport with tracing and an optional domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            inner,
            allowed_domains: None,
        })
    }

    /// Restricts requests to the given domains and their subdomains.
    /// An empty list leaves the client unrestricted.
    #[must_use]
    pub fn allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = if domains.is_empty() { None } else { Some(domains) };
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), TransportError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(());
        };

        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| TransportError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(TransportError::DomainNotAllowed(host.to_string()))
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.is_domain_allowed(&request.url)?;

        let mut builder = self.inner.request(to_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            None => builder,
            Some(Payload::Json(value)) if !request.method.sends_body() => {
                builder.query(&query_pairs(&value)?)
            }
            Some(Payload::Json(value)) => builder.json(&value),
            Some(Payload::Multipart(form)) => builder.multipart(to_form(form)?),
        };

        debug!("Sending request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, bytes = body.len(), "Response received");

        Ok(TransportResponse { status, body })
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Flattens a JSON object into query pairs. Nulls are dropped and nested
/// values are sent as JSON text.
fn query_pairs(value: &Value) -> Result<Vec<(String, String)>, TransportError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), text)
            })
            .collect()),
        _ => Err(TransportError::Body(
            "query parameters must be a JSON object".to_string(),
        )),
    }
}

fn to_form(form: MultipartForm) -> Result<Form, TransportError> {
    let mut out = Form::new();
    for (name, value) in form.fields {
        out = out.text(name, value);
    }
    for file in form.files {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| TransportError::Body(e.to_string()))?;
        }
        out = out.part(file.field, part);
    }
    Ok(out)
}

// ============================================================================
// Tests
// ============================================================================
