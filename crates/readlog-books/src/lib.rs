//! Book history API for readlog
//!
//! Typed endpoints over [`readlog_http::HttpClient`]. Responses come back as
//! [`readlog_http::ApiResponse`] envelopes; check them with
//! `HttpClient::is_success` or `HttpClient::into_data`.

pub mod api;
pub mod error;
pub mod models;

pub use api::BookApi;
pub use error::{BookError, Result};
pub use models::{Book, CoverUpload, PageResponse, ReadingStatus};
