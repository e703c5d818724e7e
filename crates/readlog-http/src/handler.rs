//! Error callbacks keyed by failure category

use std::{fmt, sync::Arc};

use tracing::{error, warn};

use crate::token::TokenStore;

/// Reaction to failed requests.
///
/// The response interceptor calls exactly one of the status methods per
/// failed request; `on_business_error` is called from
/// [`HttpClient::into_data`](crate::HttpClient::into_data).
pub trait ErrorHandler: Send + Sync {
    /// 401; `tokens` is the active token store
    fn on_unauthorized(&self, tokens: &dyn TokenStore);

    /// 403
    fn on_forbidden(&self);

    /// 404
    fn on_not_found(&self);

    /// 500, 502, 503, 504
    fn on_server_error(&self);

    /// No response was received
    fn on_network_error(&self);

    /// A response carried a code outside the success set
    fn on_business_error(&self, message: &str, code: i64);
}

/// Handler that ignores every failure
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopErrorHandler;

impl ErrorHandler for NoopErrorHandler {
    fn on_unauthorized(&self, _tokens: &dyn TokenStore) {}
    fn on_forbidden(&self) {}
    fn on_not_found(&self) {}
    fn on_server_error(&self) {}
    fn on_network_error(&self) {}
    fn on_business_error(&self, _message: &str, _code: i64) {}
}

/// Callback for 401 responses
pub type UnauthorizedCallback = Arc<dyn Fn(&dyn TokenStore) + Send + Sync>;

/// Callback without arguments
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Callback for business errors
pub type BusinessErrorCallback = Arc<dyn Fn(&str, i64) + Send + Sync>;

/// Per-category callbacks, merged field by field.
///
/// Unset callbacks do nothing.
#[derive(Clone, Default)]
pub struct ErrorCallbacks {
    pub on_unauthorized: Option<UnauthorizedCallback>,
    pub on_forbidden: Option<Callback>,
    pub on_not_found: Option<Callback>,
    pub on_server_error: Option<Callback>,
    pub on_network_error: Option<Callback>,
    pub on_business_error: Option<BusinessErrorCallback>,
}

impl ErrorCallbacks {
    /// Empty set; every category is a no-op
    pub fn new() -> Self {
        Self::default()
    }

    /// Default callbacks: log each failure, and clear the token on 401
    pub fn logging() -> Self {
        Self::new()
            .with_unauthorized(|tokens| {
                error!("Unauthorized, please sign in again");
                if let Err(e) = tokens.remove_token() {
                    warn!("Failed to clear token after 401: {e}");
                }
            })
            .with_forbidden(|| error!("Access forbidden"))
            .with_not_found(|| error!("Requested resource does not exist"))
            .with_server_error(|| error!("Server error"))
            .with_network_error(|| error!("Network error, check your connection"))
            .with_business_error(|message, code| error!(code, "Business error: {message}"))
    }

    /// Set the 401 callback
    pub fn with_unauthorized(
        mut self,
        f: impl Fn(&dyn TokenStore) + Send + Sync + 'static,
    ) -> Self {
        self.on_unauthorized = Some(Arc::new(f));
        self
    }

    /// Set the 403 callback
    pub fn with_forbidden(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_forbidden = Some(Arc::new(f));
        self
    }

    /// Set the 404 callback
    pub fn with_not_found(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_not_found = Some(Arc::new(f));
        self
    }

    /// Set the 5xx callback
    pub fn with_server_error(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_server_error = Some(Arc::new(f));
        self
    }

    /// Set the connectivity callback
    pub fn with_network_error(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_network_error = Some(Arc::new(f));
        self
    }

    /// Set the business-error callback
    pub fn with_business_error(mut self, f: impl Fn(&str, i64) + Send + Sync + 'static) -> Self {
        self.on_business_error = Some(Arc::new(f));
        self
    }

    /// Overlay `other` on `self`: callbacks set in `other` win, the rest are kept
    pub fn merged(&self, other: &ErrorCallbacks) -> ErrorCallbacks {
        ErrorCallbacks {
            on_unauthorized: other
                .on_unauthorized
                .clone()
                .or_else(|| self.on_unauthorized.clone()),
            on_forbidden: other.on_forbidden.clone().or_else(|| self.on_forbidden.clone()),
            on_not_found: other.on_not_found.clone().or_else(|| self.on_not_found.clone()),
            on_server_error: other
                .on_server_error
                .clone()
                .or_else(|| self.on_server_error.clone()),
            on_network_error: other
                .on_network_error
                .clone()
                .or_else(|| self.on_network_error.clone()),
            on_business_error: other
                .on_business_error
                .clone()
                .or_else(|| self.on_business_error.clone()),
        }
    }
}

impl ErrorHandler for ErrorCallbacks {
    fn on_unauthorized(&self, tokens: &dyn TokenStore) {
        if let Some(f) = &self.on_unauthorized {
            f(tokens);
        }
    }

    fn on_forbidden(&self) {
        if let Some(f) = &self.on_forbidden {
            f();
        }
    }

    fn on_not_found(&self) {
        if let Some(f) = &self.on_not_found {
            f();
        }
    }

    fn on_server_error(&self) {
        if let Some(f) = &self.on_server_error {
            f();
        }
    }

    fn on_network_error(&self) {
        if let Some(f) = &self.on_network_error {
            f();
        }
    }

    fn on_business_error(&self, message: &str, code: i64) {
        if let Some(f) = &self.on_business_error {
            f(message, code);
        }
    }
}

impl fmt::Debug for ErrorCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorCallbacks")
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .field("on_forbidden", &self.on_forbidden.is_some())
            .field("on_not_found", &self.on_not_found.is_some())
            .field("on_server_error", &self.on_server_error.is_some())
            .field("on_network_error", &self.on_network_error.is_some())
            .field("on_business_error", &self.on_business_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::token::MemoryTokenStore;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_empty_callbacks_are_noops() {
        let callbacks = ErrorCallbacks::new();
        let tokens = MemoryTokenStore::with_token("t");
        callbacks.on_unauthorized(&tokens);
        callbacks.on_network_error();
        callbacks.on_business_error("boom", 5001);
        assert_eq!(tokens.get_token().unwrap().as_deref(), Some("t"));
    }

    #[test]
    fn test_logging_unauthorized_clears_token() {
        let tokens = MemoryTokenStore::with_token("expired");
        ErrorCallbacks::logging().on_unauthorized(&tokens);
        assert_eq!(tokens.get_token().unwrap(), None);
    }

    #[test]
    fn test_merge_keeps_unspecified_callbacks() {
        let (forbidden_count, forbidden) = counter();
        let (old_unauth_count, old_unauth) = counter();
        let (new_unauth_count, new_unauth) = counter();

        let base = ErrorCallbacks::new()
            .with_forbidden(forbidden)
            .with_unauthorized(move |_| old_unauth());
        let patch = ErrorCallbacks::new().with_unauthorized(move |_| new_unauth());
        let merged = base.merged(&patch);

        let tokens = MemoryTokenStore::new();
        merged.on_unauthorized(&tokens);
        merged.on_forbidden();

        assert_eq!(new_unauth_count.load(Ordering::SeqCst), 1);
        assert_eq!(old_unauth_count.load(Ordering::SeqCst), 0);
        assert_eq!(forbidden_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_business_error_receives_message_and_code() {
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let s = seen.clone();
        let callbacks = ErrorCallbacks::new()
            .with_business_error(move |message, code| *s.lock() = Some((message.to_string(), code)));

        callbacks.on_business_error("out of stock", 4002);
        assert_eq!(*seen.lock(), Some(("out of stock".to_string(), 4002)));
    }

    #[test]
    fn test_debug_lists_installed_callbacks() {
        let callbacks = ErrorCallbacks::new().with_not_found(|| {});
        let text = format!("{callbacks:?}");
        assert!(text.contains("on_not_found: true"));
        assert!(text.contains("on_forbidden: false"));
    }
}
