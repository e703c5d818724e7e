//! Unified response envelope
//!
//! Every verb function resolves to a value built from an [`ApiResponse`],
//! whether the server answered 2xx, answered with an error status, never
//! answered, or the request was never sent. Callers branch on `code`.

use bytes::Bytes;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{HttpError, Result};

/// Code used when no response was received
pub const NETWORK_ERROR_CODE: i64 = 0;

/// Code used when the request could not be built or sent
pub const CONFIG_ERROR_CODE: i64 = -1;

/// Fixed message for connectivity failures
pub const NETWORK_ERROR_MESSAGE: &str = "network error, check your connection";

/// Fallback message for construction failures with no error text
pub const CONFIG_ERROR_MESSAGE: &str = "request configuration error";

/// The `{code, data, message}` envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// Build an envelope
    pub fn new(code: i64, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            code,
            data,
            message: message.into(),
        }
    }

    /// Whether `code` is one of `success_codes`
    pub fn is_success_in(&self, success_codes: &[i64]) -> bool {
        success_codes.contains(&self.code)
    }

    /// Drop the payload, keeping code and message
    pub fn without_data(self) -> ApiResponse<()> {
        ApiResponse {
            code: self.code,
            data: None,
            message: self.message,
        }
    }
}

impl ApiResponse<()> {
    /// Envelope for a non-2xx HTTP response
    pub fn http_error(status: u16, message: impl Into<String>) -> Self {
        Self::new(i64::from(status), None, message)
    }

    /// Envelope for a request that got no response
    pub fn network_error() -> Self {
        Self::new(NETWORK_ERROR_CODE, None, NETWORK_ERROR_MESSAGE)
    }

    /// Envelope for a request that was never sent
    pub fn config_error(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            Self::new(CONFIG_ERROR_CODE, None, CONFIG_ERROR_MESSAGE)
        } else {
            Self::new(CONFIG_ERROR_CODE, None, message)
        }
    }

    /// Re-type a failure envelope for any payload type
    pub fn cast<T>(self) -> ApiResponse<T> {
        ApiResponse {
            code: self.code,
            data: None,
            message: self.message,
        }
    }
}

/// A type a verb function can resolve to.
///
/// `from_json` is the normalized path and `from_raw` the passthrough path
/// used when normalization is skipped. `from_empty` covers a 2xx with no
/// body (e.g. 204), and `from_failure` carries a failure envelope into the
/// declared type.
pub trait ResponseBody: Sized + Send + 'static {
    /// Decode a JSON body
    fn from_json(bytes: &[u8]) -> Result<Self>;

    /// Take the transport bytes unchanged
    fn from_raw(bytes: Vec<u8>) -> Result<Self>;

    /// Represent a 2xx response without a body
    fn from_empty(status: StatusCode) -> Self;

    /// Represent a normalized failure
    fn from_failure(failure: ApiResponse<()>) -> Self;
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| HttpError::Decode(e.to_string()))
}

impl<T> ResponseBody for ApiResponse<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn from_json(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }

    fn from_raw(bytes: Vec<u8>) -> Result<Self> {
        decode(&bytes)
    }

    /// `code` is the HTTP status, as for error statuses
    fn from_empty(status: StatusCode) -> Self {
        ApiResponse::new(
            i64::from(status.as_u16()),
            None,
            status.canonical_reason().unwrap_or_default(),
        )
    }

    fn from_failure(failure: ApiResponse<()>) -> Self {
        failure.cast()
    }
}

impl ResponseBody for serde_json::Value {
    fn from_json(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }

    fn from_raw(bytes: Vec<u8>) -> Result<Self> {
        decode(&bytes)
    }

    fn from_empty(_status: StatusCode) -> Self {
        serde_json::Value::Null
    }

    fn from_failure(failure: ApiResponse<()>) -> Self {
        serde_json::json!({
            "code": failure.code,
            "data": null,
            "message": failure.message,
        })
    }
}

impl ResponseBody for String {
    fn from_json(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }

    fn from_raw(bytes: Vec<u8>) -> Result<Self> {
        String::from_utf8(bytes).map_err(|e| HttpError::Decode(e.to_string()))
    }

    fn from_empty(_status: StatusCode) -> Self {
        String::new()
    }

    fn from_failure(failure: ApiResponse<()>) -> Self {
        serde_json::Value::from_failure(failure).to_string()
    }
}

impl ResponseBody for Bytes {
    fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(Bytes::copy_from_slice(bytes))
    }

    fn from_raw(bytes: Vec<u8>) -> Result<Self> {
        Ok(Bytes::from(bytes))
    }

    fn from_empty(_status: StatusCode) -> Self {
        Bytes::new()
    }

    fn from_failure(failure: ApiResponse<()>) -> Self {
        Bytes::from(String::from_failure(failure))
    }
}
