//! Book API error types

use thiserror::Error;

/// Book API result type
pub type Result<T> = std::result::Result<T, BookError>;

/// Book API errors
#[derive(Debug, Error)]
pub enum BookError {
    #[error("Invalid cover upload: {0}")]
    InvalidUpload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] readlog_http::HttpError),
}
