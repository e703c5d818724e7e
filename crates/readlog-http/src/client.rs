//! HTTP client implementation

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::{header::CONTENT_TYPE, multipart::Form, Method};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::{
    cancel::{create_cancelable_request, CancelableRequest},
    config::{RequestOptions, RequestOptionsPatch},
    error::Result,
    handler::ErrorHandler,
    middleware::{authorize, normalize_failure, normalize_success, Failure},
    request::RequestConfig,
    response::{ApiResponse, ResponseBody},
    token::TokenStore,
    transport::{ReqwestTransport, RequestBody, Transport, TransportError, TransportRequest},
};

/// Body of a request that is either ready or failed to serialize
type PreparedBody = std::result::Result<RequestBody, String>;

/// Request wrapper with bearer auth and normalized responses.
///
/// Cloning is cheap; clones share configuration and transport.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    options: Arc<RwLock<Arc<RequestOptions>>>,
}

impl HttpClient {
    /// Create a new HTTP client with configuration
    pub fn new(options: RequestOptions) -> Result<Self> {
        Self::with_transport(options, Arc::new(ReqwestTransport::new()?))
    }

    /// Create HTTP client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(RequestOptions::default())
    }

    /// Create a client over a custom transport
    pub fn with_transport(options: RequestOptions, transport: Arc<dyn Transport>) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            transport,
            options: Arc::new(RwLock::new(Arc::new(options))),
        })
    }

    /// Current effective configuration
    pub fn options(&self) -> Arc<RequestOptions> {
        self.options.read().clone()
    }

    /// Apply `patch` and install the result as the new configuration.
    ///
    /// Requests already in flight keep the configuration they started with.
    pub fn configure(&self, patch: RequestOptionsPatch) -> Result<Arc<RequestOptions>> {
        let mut current = self.options.write();
        let next = current.merged(patch);
        next.validate()?;
        let next = Arc::new(next);
        *current = next.clone();
        debug!(base_url = %next.base_url, timeout = ?next.timeout, "Request options updated");
        Ok(next)
    }

    /// GET request
    pub async fn get<B: ResponseBody>(&self, url: &str, config: RequestConfig) -> Result<B> {
        self.dispatch(Method::GET, url, Ok(RequestBody::Empty), config).await
    }

    /// POST request with a JSON body
    pub async fn post<B, D>(&self, url: &str, data: &D, config: RequestConfig) -> Result<B>
    where
        B: ResponseBody,
        D: Serialize + ?Sized,
    {
        self.dispatch(Method::POST, url, json_body(data), config).await
    }

    /// PUT request with a JSON body
    pub async fn put<B, D>(&self, url: &str, data: &D, config: RequestConfig) -> Result<B>
    where
        B: ResponseBody,
        D: Serialize + ?Sized,
    {
        self.dispatch(Method::PUT, url, json_body(data), config).await
    }

    /// PATCH request with a JSON body
    pub async fn patch<B, D>(&self, url: &str, data: &D, config: RequestConfig) -> Result<B>
    where
        B: ResponseBody,
        D: Serialize + ?Sized,
    {
        self.dispatch(Method::PATCH, url, json_body(data), config).await
    }

    /// DELETE request
    pub async fn delete<B: ResponseBody>(&self, url: &str, config: RequestConfig) -> Result<B> {
        self.dispatch(Method::DELETE, url, Ok(RequestBody::Empty), config)
            .await
    }

    /// Multipart POST; the multipart content type replaces any caller-set one
    pub async fn upload<B: ResponseBody>(
        &self,
        url: &str,
        form: Form,
        config: RequestConfig,
    ) -> Result<B> {
        self.dispatch(Method::POST, url, Ok(RequestBody::Multipart(form)), config)
            .await
    }

    /// GET that can be cancelled while in flight
    pub fn get_cancelable<B: ResponseBody>(
        &self,
        url: &str,
        config: RequestConfig,
    ) -> CancelableRequest<B> {
        let client = self.clone();
        let url = url.to_string();
        create_cancelable_request(move |signal| async move {
            client
                .dispatch(
                    Method::GET,
                    &url,
                    Ok(RequestBody::Empty),
                    config.with_cancel(signal),
                )
                .await
        })
    }

    /// POST that can be cancelled while in flight
    pub fn post_cancelable<B, D>(
        &self,
        url: &str,
        data: &D,
        config: RequestConfig,
    ) -> CancelableRequest<B>
    where
        B: ResponseBody,
        D: Serialize + ?Sized,
    {
        let client = self.clone();
        let url = url.to_string();
        let body = json_body(data);
        create_cancelable_request(move |signal| async move {
            client
                .dispatch(Method::POST, &url, body, config.with_cancel(signal))
                .await
        })
    }

    /// Whether `response.code` is a configured success code
    pub fn is_success<T>(&self, response: &ApiResponse<T>) -> bool {
        response.is_success_in(&self.options().success_codes)
    }

    /// Payload of a successful envelope.
    ///
    /// Any other code fires `on_business_error` once and returns the
    /// envelope without its payload.
    pub fn into_data<T>(
        &self,
        response: ApiResponse<T>,
    ) -> std::result::Result<Option<T>, ApiResponse<()>> {
        let options = self.options();
        if response.is_success_in(&options.success_codes) {
            return Ok(response.data);
        }
        options
            .error_handler
            .on_business_error(&response.message, response.code);
        Err(response.without_data())
    }

    /// Active token store
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        self.options().token_store.clone()
    }

    /// Read the current token
    pub fn get_token(&self) -> Result<Option<String>> {
        self.options().token_store.get_token()
    }

    /// Store a token for subsequent requests
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.options().token_store.set_token(token)
    }

    /// Forget the stored token
    pub fn remove_token(&self) -> Result<()> {
        self.options().token_store.remove_token()
    }

    async fn dispatch<B: ResponseBody>(
        &self,
        method: Method,
        url: &str,
        body: PreparedBody,
        config: RequestConfig,
    ) -> Result<B> {
        let options = self.options();

        if let Some(signal) = config.cancel.as_ref().filter(|s| s.is_cancelled()) {
            return Err(signal.to_error());
        }

        let outcome = match self.prepare(&options, method, url, body, &config) {
            Ok(request) => match &config.cancel {
                Some(signal) => tokio::select! {
                    biased;
                    _ = signal.cancelled() => {
                        debug!("Request to {url} cancelled in flight");
                        return Err(signal.to_error());
                    }
                    result = self.transport.send(request) => result,
                },
                None => self.transport.send(request).await,
            },
            Err(reason) => Err(TransportError::NotSent(reason)),
        };

        let failure = match outcome {
            Ok(response) if response.status.is_success() => {
                let passthrough = config.skip_response_interceptor || options.raw_response;
                return normalize_success(response, passthrough);
            }
            Ok(response) => Failure::Status(response),
            Err(TransportError::NoResponse(reason)) => Failure::NoResponse(reason),
            Err(TransportError::NotSent(reason)) => Failure::NotSent(reason),
        };

        let handler: &dyn ErrorHandler = match &config.custom_error_handler {
            Some(custom) => custom.as_ref(),
            None => &options.error_handler,
        };
        let envelope = normalize_failure(failure, handler, options.token_store.as_ref());
        Ok(B::from_failure(envelope))
    }

    fn prepare(
        &self,
        options: &RequestOptions,
        method: Method,
        url: &str,
        body: PreparedBody,
        config: &RequestConfig,
    ) -> std::result::Result<TransportRequest, String> {
        let url = resolve_url(&options.base_url, url)?;
        let body = body?;

        let mut headers = config.headers.clone();
        if matches!(body, RequestBody::Multipart(_)) {
            headers.remove(CONTENT_TYPE);
        }
        authorize(&mut headers, options.token_store.as_ref())?;

        Ok(TransportRequest {
            method,
            url,
            headers,
            query: config.query.clone(),
            body,
            timeout: config.timeout.unwrap_or(options.timeout),
        })
    }
}

fn json_body<D: Serialize + ?Sized>(data: &D) -> PreparedBody {
    serde_json::to_value(data)
        .map(RequestBody::Json)
        .map_err(|e| format!("failed to serialize request body: {e}"))
}

/// Whether `url` carries its own scheme and authority
fn is_absolute(url: &str) -> bool {
    match url.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Join `url` onto `base_url` unless it is already absolute
pub fn resolve_url(base_url: &str, url: &str) -> std::result::Result<Url, String> {
    let full = if is_absolute(url) {
        url.to_string()
    } else if url.is_empty() {
        base_url.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    };
    Url::parse(&full).map_err(|e| format!("invalid request URL {full:?}: {e}"))
}
