//! Per-request configuration

use std::{fmt, sync::Arc, time::Duration};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{cancel::CancelSignal, handler::ErrorHandler};

/// Configuration of a single outgoing request
#[derive(Clone, Default)]
pub struct RequestConfig {
    /// Extra headers; the bearer token and multipart content type override these
    pub headers: HeaderMap,
    /// Query string parameters
    pub query: Vec<(String, String)>,
    /// Overrides the configured timeout
    pub timeout: Option<Duration>,
    /// Hand the body through without JSON decoding
    pub skip_response_interceptor: bool,
    /// Replaces the configured error handler for this request
    pub custom_error_handler: Option<Arc<dyn ErrorHandler>>,
    /// Cancellation signal observed while the request is in flight
    pub cancel: Option<CancelSignal>,
}

impl RequestConfig {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Skip response normalization
    pub fn skip_response_interceptor(mut self) -> Self {
        self.skip_response_interceptor = true;
        self
    }

    /// Use `handler` instead of the configured callbacks
    pub fn with_error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.custom_error_handler = Some(handler);
        self
    }

    /// Attach a cancellation signal
    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("timeout", &self.timeout)
            .field("skip_response_interceptor", &self.skip_response_interceptor)
            .field("custom_error_handler", &self.custom_error_handler.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}
