//! Request envelope types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;

// ============================================================================
// HTTP Method
// ============================================================================

/// HTTP methods the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET (payload sent as query parameters).
    #[default]
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// PATCH.
    Patch,
    /// DELETE (payload sent as query parameters).
    Delete,
}

impl HttpMethod {
    /// Returns the canonical upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Returns true if a JSON payload travels in the request body rather
    /// than the query string.
    pub fn sends_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(CoreError::UnknownMethod(s.to_string())),
        }
    }
}

// ============================================================================
// Payload
// ============================================================================

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name (e.g. `resumeFile`).
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
    /// File contents. Held in memory so a replay can resend them.
    pub bytes: Vec<u8>,
}

/// A multipart form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    /// Plain text fields.
    pub fields: Vec<(String, String)>,
    /// File parts.
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Adds a file part.
    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.files.push(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            content_type,
            bytes,
        });
        self
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON body, or query parameters for GET/DELETE.
    Json(serde_json::Value),
    /// Multipart form upload.
    Multipart(MultipartForm),
}

impl Payload {
    /// Returns true for multipart payloads.
    pub fn is_multipart(&self) -> bool {
        matches!(self, Payload::Multipart(_))
    }
}

// ============================================================================
// Api Request
// ============================================================================

/// A single outbound API call.
///
/// Built per call and cloned for replays; carries no state beyond its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Path relative to the configured base URL (e.g. `/api/seeker/info`).
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Optional payload.
    pub data: Option<Payload>,
    /// Extra headers, applied after the default `Content-Type`.
    pub headers: Vec<(String, String)>,
    /// Per-request timeout; the client default applies when `None`.
    pub timeout: Option<Duration>,
    /// Never attach the bearer token, and never trigger a refresh on 401.
    pub skip_auth: bool,
}

impl ApiRequest {
    /// Creates a request with the given method and path.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            data: None,
            headers: Vec::new(),
            timeout: None,
            skip_auth: false,
        }
    }

    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Creates a PUT request.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// Creates a PATCH request.
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    /// Creates a DELETE request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Sets a JSON payload.
    pub fn with_json(mut self, value: serde_json::Value) -> Self {
        self.data = Some(Payload::Json(value));
        self
    }

    /// Serializes `body` into a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn with_body<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, CoreError> {
        Ok(self.with_json(serde_json::to_value(body)?))
    }

    /// Sets a multipart payload.
    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.data = Some(Payload::Multipart(form));
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Marks the request as unauthenticated.
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Returns the path without any query string.
    pub fn path(&self) -> &str {
        self.url.split(['?', '#']).next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parse() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_method_body_placement() {
        assert!(!HttpMethod::Get.sends_body());
        assert!(!HttpMethod::Delete.sends_body());
        assert!(HttpMethod::Post.sends_body());
        assert!(HttpMethod::Put.sends_body());
    }

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::post("/api/user-auth/login")
            .with_json(json!({"username": "u1"}))
            .header("X-Trace", "1")
            .timeout(Duration::from_secs(5))
            .skip_auth();

        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.skip_auth);
        assert_eq!(req.timeout, Some(Duration::from_secs(5)));
        assert_eq!(req.headers, vec![("X-Trace".to_string(), "1".to_string())]);
        assert_eq!(req.data, Some(Payload::Json(json!({"username": "u1"}))));
    }

    #[test]
    fn test_path_strips_query() {
        let req = ApiRequest::post("/api/user-auth/verify-code?email=a%40b.c&code=1");
        assert_eq!(req.path(), "/api/user-auth/verify-code");
    }

    #[test]
    fn test_multipart_builder() {
        let form = MultipartForm::new()
            .text("resumeName", "cv")
            .file("resumeFile", "cv.pdf", Some("application/pdf".into()), vec![1, 2]);
        let req = ApiRequest::post("/api/seeker/upload-resume").with_multipart(form);

        let Some(Payload::Multipart(form)) = &req.data else {
            panic!("expected multipart payload");
        };
        assert_eq!(form.fields.len(), 1);
        assert_eq!(form.files[0].file_name, "cv.pdf");
        assert!(req.data.as_ref().unwrap().is_multipart());
    }
}
