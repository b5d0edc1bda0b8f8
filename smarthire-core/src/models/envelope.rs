//! Response envelope.
//!
//! Every backend endpoint answers with the same wrapper:
//!
//! ```json
//! { "code": 0, "message": "操作成功", "data": { ... } }
//! ```
//!
//! `code == 0` signals success; anything else is an application error and
//! `message` explains it.

use serde::{Deserialize, Deserializer, Serialize};

/// Envelope code signalling success.
pub const SUCCESS_CODE: i64 = 0;

/// The `{code, message, data}` wrapper around every API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct ApiResponse<T> {
    /// Application status code (0 = success).
    pub code: i64,
    /// Human-readable message; empty when the server sent none.
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Response payload; `T::default()` when missing or null.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Builds a success envelope.
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: String::new(),
            data,
        }
    }

    /// Returns true if the envelope code signals success.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

impl<T: Default> ApiResponse<T> {
    /// Builds an error envelope with no payload.
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: T::default(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
