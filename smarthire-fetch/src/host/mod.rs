//! Host seams for the API client.
//!
//! - [`transport`] - The `Transport` trait and its request/response types
//! - [`http`] - reqwest-backed transport with tracing and domain allowlist
//! - [`navigator`] - Where the user is sent when the session ends

pub mod http;
pub mod navigator;
pub mod transport;

pub use http::HttpClient;
pub use navigator::{LogNavigator, Navigator};
pub use transport::{Transport, TransportRequest, TransportResponse};
