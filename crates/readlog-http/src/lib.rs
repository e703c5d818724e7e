//! Request wrapper for the readlog API
//!
//! Wraps an HTTP transport with one configuration per client, bearer-token
//! injection, and response normalization: every request resolves to the
//! `{code, data, message}` envelope, whatever went wrong on the way.
//!
//! ## Features
//!
//! - **Uniform envelope**: HTTP errors, lost connections and unsendable
//!   requests all resolve to [`ApiResponse`] values; callers branch on `code`
//! - **Swappable token storage**: [`TokenStore`], read on every request
//! - **Error callbacks**: [`ErrorHandler`] per failure category, overridable per request
//! - **Cancellation**: [`create_cancelable_request`] and the `*_cancelable` verbs
//! - **Trait-based transport**: mockable via [`Transport`]
//!
//! ```no_run
//! use readlog_http::{ApiResponse, HttpClient, RequestConfig, RequestOptions};
//!
//! # async fn run() -> readlog_http::Result<()> {
//! let client = HttpClient::new(RequestOptions::new().with_base_url("https://example.com/api"))?;
//! let resp: ApiResponse<serde_json::Value> = client.get("/books", RequestConfig::new()).await?;
//! if client.is_success(&resp) {
//!     println!("{:?}", resp.data);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod token;
pub mod transport;

pub use cancel::{create_cancelable_request, CancelSignal, CancelableRequest};
pub use client::HttpClient;
pub use config::{HttpSettings, RequestOptions, RequestOptionsPatch};
pub use error::{is_cancel, HttpError, Result};
pub use handler::{ErrorCallbacks, ErrorHandler, NoopErrorHandler};
pub use request::RequestConfig;
pub use response::{ApiResponse, ResponseBody};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transport::{ReqwestTransport, Transport};

/// Re-export commonly used types
pub use bytes::Bytes;
pub use reqwest::{header, multipart, Method, StatusCode};
