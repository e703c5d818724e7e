//! HTTP client error types
//!
//! Transport and HTTP-status failures never show up here: they are folded
//! into an [`ApiResponse`](crate::ApiResponse) envelope. `HttpError` only
//! carries cancellations and setup or programming errors.

use thiserror::Error;

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, HttpError>;

/// HTTP client errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request was cancelled through its cancellation handle
    #[error("Request cancelled{}", reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Cancelled { reason: Option<String> },

    /// A response body did not match the declared result type
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Malformed configuration passed to `configure`
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Token storage could not be read or written
    #[error("Token store error: {0}")]
    TokenStore(String),

    /// Settings could not be loaded
    #[error("Failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl HttpError {
    /// Check if error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpError::Cancelled { .. })
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::TokenStore(err.to_string())
    }
}

/// Check whether a caught error is a cancellation rather than another failure.
pub fn is_cancel(error: &HttpError) -> bool {
    error.is_cancelled()
}
