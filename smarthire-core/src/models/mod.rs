//! Domain models for SmartHire.
//!
//! ## Submodules
//!
//! - [`envelope`] - Response envelope (`ApiResponse`)
//! - [`request`] - Request envelope (`ApiRequest`, `Payload`, `HttpMethod`)
//! - [`auth`] - Login/refresh DTOs and the `Session` snapshot
//! - [`claims`] - Access token claim decoding
//! - [`app`] - Client app flavors

mod app;
mod auth;
mod claims;
mod envelope;
mod request;

pub use app::AppFlavor;
pub use auth::{AuthTokens, LoginRequest, RefreshTokenRequest, Session};
pub use claims::{TokenClaims, UserType};
pub use envelope::{ApiResponse, SUCCESS_CODE};
pub use request::{ApiRequest, FilePart, HttpMethod, MultipartForm, Payload};
