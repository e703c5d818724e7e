//! Request and response interceptors
//!
//! The outbound interceptor attaches the bearer token. The inbound
//! interceptors turn every outcome into either the declared body type or a
//! failure envelope; failures never escape as errors.

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    StatusCode,
};
use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    error::Result,
    handler::ErrorHandler,
    response::{ApiResponse, ResponseBody},
    token::TokenStore,
    transport::TransportResponse,
};

/// Outcome of a dispatch that did not produce a 2xx response
#[derive(Debug)]
pub enum Failure {
    /// A response arrived with a non-2xx status
    Status(TransportResponse),
    /// The request went out, nothing came back
    NoResponse(String),
    /// The request was never sent
    NotSent(String),
}

/// Attach `Authorization: Bearer <token>` when the store holds a token.
///
/// Returns the reason on failure; the request must then not be sent.
pub fn authorize(headers: &mut HeaderMap, tokens: &dyn TokenStore) -> std::result::Result<(), String> {
    let token = tokens.get_token().map_err(|e| e.to_string())?;
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| format!("invalid token for Authorization header: {e}"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(())
}

/// Success path: raw passthrough or JSON decoding, never code inspection.
///
/// An empty body (204 and friends) never reaches the decoder.
pub fn normalize_success<B: ResponseBody>(response: TransportResponse, passthrough: bool) -> Result<B> {
    if response.body.is_empty() {
        debug!(status = %response.status, "Response received without a body");
        return Ok(B::from_empty(response.status));
    }
    if passthrough {
        debug!(status = %response.status, "Passing response body through");
        return B::from_raw(response.body);
    }
    debug!(
        status = %response.status,
        body = %String::from_utf8_lossy(&response.body),
        "Response received"
    );
    B::from_json(&response.body)
}

/// Failure path: fire the matching callback once and build the envelope
pub fn normalize_failure(
    failure: Failure,
    handler: &dyn ErrorHandler,
    tokens: &dyn TokenStore,
) -> ApiResponse<()> {
    match failure {
        Failure::Status(response) => {
            let status = response.status;
            match status.as_u16() {
                401 => handler.on_unauthorized(tokens),
                403 => handler.on_forbidden(),
                404 => handler.on_not_found(),
                500 | 502 | 503 | 504 => handler.on_server_error(),
                _ => {}
            }
            ApiResponse::http_error(status.as_u16(), error_message(status, &response.body))
        }
        Failure::NoResponse(reason) => {
            debug!("No response received: {reason}");
            handler.on_network_error();
            ApiResponse::network_error()
        }
        Failure::NotSent(reason) => {
            error!("Request configuration error: {reason}");
            ApiResponse::config_error(reason)
        }
    }
}

#[derive(Deserialize)]
struct ServerMessage {
    message: Option<String>,
}

/// Server-provided `message`, else the status reason, else a generic text
pub fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ServerMessage>(body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("Request failed: {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::{
        error::HttpError,
        handler::ErrorCallbacks,
        token::MemoryTokenStore,
    };

    struct FailingStore;

    impl TokenStore for FailingStore {
        fn get_token(&self) -> Result<Option<String>> {
            Err(HttpError::TokenStore("keychain locked".to_string()))
        }
        fn set_token(&self, _token: &str) -> Result<()> {
            Ok(())
        }
        fn remove_token(&self) -> Result<()> {
            Ok(())
        }
    }

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_authorize_with_token() {
        let mut headers = HeaderMap::new();
        authorize(&mut headers, &MemoryTokenStore::with_token("abc")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn test_authorize_without_token() {
        let mut headers = HeaderMap::new();
        authorize(&mut headers, &MemoryTokenStore::new()).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_authorize_store_failure() {
        let mut headers = HeaderMap::new();
        let err = authorize(&mut headers, &FailingStore).unwrap_err();
        assert!(err.contains("keychain locked"));
    }

    #[test]
    fn test_authorize_rejects_header_breaking_token() {
        let mut headers = HeaderMap::new();
        let result = authorize(&mut headers, &MemoryTokenStore::with_token("bad\ntoken"));
        assert!(result.is_err());
    }

    #[test]
    fn test_error_message_prefers_server_message() {
        let msg = error_message(StatusCode::BAD_REQUEST, br#"{"message": "title is required"}"#);
        assert_eq!(msg, "title is required");
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(error_message(StatusCode::NOT_FOUND, b"<html>"), "Not Found");
        assert_eq!(error_message(StatusCode::CONFLICT, br#"{"message": ""}"#), "Conflict");
    }

    #[test]
    fn test_error_message_generic_fallback() {
        let status = StatusCode::from_u16(599).unwrap();
        assert_eq!(error_message(status, b""), "Request failed: 599");
    }

    #[test]
    fn test_status_failure_fires_matching_callback_once() {
        let forbidden = Arc::new(AtomicUsize::new(0));
        let f = forbidden.clone();
        let handler = ErrorCallbacks::new().with_forbidden(move || {
            f.fetch_add(1, Ordering::SeqCst);
        });

        let envelope = normalize_failure(
            Failure::Status(response(403, "")),
            &handler,
            &MemoryTokenStore::new(),
        );

        assert_eq!(forbidden.load(Ordering::SeqCst), 1);
        assert_eq!(envelope.code, 403);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message, "Forbidden");
    }

    #[test]
    fn test_no_response_envelope() {
        let network = Arc::new(AtomicUsize::new(0));
        let n = network.clone();
        let handler = ErrorCallbacks::new().with_network_error(move || {
            n.fetch_add(1, Ordering::SeqCst);
        });

        let envelope = normalize_failure(
            Failure::NoResponse("connection reset".to_string()),
            &handler,
            &MemoryTokenStore::new(),
        );

        assert_eq!(network.load(Ordering::SeqCst), 1);
        assert_eq!(envelope, ApiResponse::network_error());
    }

    #[test]
    fn test_not_sent_envelope() {
        let envelope = normalize_failure(
            Failure::NotSent("relative URL without a base".to_string()),
            &ErrorCallbacks::new(),
            &MemoryTokenStore::new(),
        );
        assert_eq!(envelope.code, -1);
        assert_eq!(envelope.message, "relative URL without a base");
    }

    #[test]
    fn test_success_passthrough_and_decode() {
        let raw: String = normalize_success(response(200, "not json"), true).unwrap();
        assert_eq!(raw, "not json");

        let decoded: ApiResponse<u32> =
            normalize_success(response(200, r#"{"code": 7, "data": 1, "message": ""}"#), false)
                .unwrap();
        assert_eq!(decoded.code, 7);
        assert_eq!(decoded.data, Some(1));
    }

    #[test]
    fn test_success_without_body_is_not_an_error() {
        let envelope: ApiResponse<u32> = normalize_success(response(204, ""), false).unwrap();
        assert_eq!(envelope.code, 204);
        assert!(envelope.data.is_none());

        let value: serde_json::Value = normalize_success(response(200, ""), false).unwrap();
        assert!(value.is_null());

        let text: String = normalize_success(response(204, ""), true).unwrap();
        assert!(text.is_empty());
    }
}
