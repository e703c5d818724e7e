//! Transport seam between the client and the network

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, multipart::Form, Method, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::{HttpError, Result};

/// Outgoing request body
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

/// A fully resolved request, ready to dispatch
#[derive(Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout: Duration,
}

/// A received response of any status
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Why a dispatch produced no response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be built; nothing went on the wire
    NotSent(String),
    /// The request went out but no response came back
    NoResponse(String),
}

/// Mockable HTTP transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch one request.
    ///
    /// Dropping the returned future aborts the call.
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// Production transport backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with its own connection pool
    pub fn new() -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(format!("readlog/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::ClientBuild(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Wrap an existing reqwest client
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Get underlying reqwest client (for advanced usage)
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::NotSent(err.to_string())
    } else {
        TransportError::NoResponse(err.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        debug!("HTTP {} {}", request.method, request.url);

        let mut builder = self
            .inner
            .request(request.method, request.url)
            .headers(request.headers)
            .timeout(request.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_no_response() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new().unwrap();
        let request = TransportRequest {
            method: Method::GET,
            url: Url::parse(&format!("http://{addr}/books")).unwrap(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            timeout: Duration::from_secs(2),
        };

        let result = transport.send(request).await;
        assert!(matches!(result, Err(TransportError::NoResponse(_))));
    }
}
