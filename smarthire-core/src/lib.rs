// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # SmartHire Core
//!
//! Wire types and models shared by the SmartHire client crates.
//!
//! ## Key Types
//!
//! ### Envelopes
//! - [`ApiResponse`] - The `{code, message, data}` wrapper around every reply
//! - [`ApiRequest`] - A single outbound call (url, method, payload, headers)
//! - [`Payload`] / [`MultipartForm`] - JSON or multipart request bodies
//!
//! ### Authentication
//! - [`AuthTokens`] - Access/refresh token pair returned by login and refresh
//! - [`Session`] - Snapshot of the persisted credential state
//! - [`TokenClaims`] - Unverified view of the access token payload
//!
//! ### Apps
//! - [`AppFlavor`] - Job-seeker, HR, or admin client

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    // Envelopes
    ApiRequest,
    ApiResponse,
    FilePart,
    HttpMethod,
    MultipartForm,
    Payload,
    SUCCESS_CODE,
    // Auth
    AuthTokens,
    LoginRequest,
    RefreshTokenRequest,
    Session,
    TokenClaims,
    UserType,
    // Apps
    AppFlavor,
};
