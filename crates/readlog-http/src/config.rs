//! HTTP client configuration

use std::{fmt, path::Path, sync::Arc, time::Duration};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{
    error::{HttpError, Result},
    handler::ErrorCallbacks,
    token::{FileTokenStore, TokenStore},
};

/// Base URL used when `READLOG_API_BASE_URL` was not set at build time
pub const FALLBACK_BASE_URL: &str = "/api";

/// Environment prefix for [`HttpSettings::load`]
pub const ENV_PREFIX: &str = "READLOG_HTTP";

/// Serializable client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Skip JSON decoding of 2xx bodies
    #[serde(default)]
    pub raw_response: bool,

    /// Business codes treated as success
    #[serde(default = "default_success_codes")]
    pub success_codes: Vec<i64>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            raw_response: false,
            success_codes: default_success_codes(),
        }
    }
}

impl HttpSettings {
    /// Load settings from an optional TOML file, overridden by
    /// `READLOG_HTTP_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("success_codes"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Get timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// Default value functions for serde
fn default_base_url() -> String {
    option_env!("READLOG_API_BASE_URL")
        .filter(|url| !url.is_empty())
        .unwrap_or(FALLBACK_BASE_URL)
        .to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_success_codes() -> Vec<i64> {
    vec![200, 0]
}

/// Effective configuration of one client.
///
/// Treated as immutable: [`RequestOptions::merged`] builds a new value.
#[derive(Clone)]
pub struct RequestOptions {
    pub base_url: String,
    pub timeout: Duration,
    pub token_store: Arc<dyn TokenStore>,
    pub error_handler: ErrorCallbacks,
    pub raw_response: bool,
    pub success_codes: Vec<i64>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::from_settings(HttpSettings::default())
    }
}

impl RequestOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Full options from settings, with the file token store and logging callbacks
    pub fn from_settings(settings: HttpSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            base_url: settings.base_url,
            token_store: Arc::new(FileTokenStore::with_default_path()),
            error_handler: ErrorCallbacks::logging(),
            raw_response: settings.raw_response,
            success_codes: settings.success_codes,
        }
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set token store
    pub fn with_token_store(mut self, token_store: Arc<dyn TokenStore>) -> Self {
        self.token_store = token_store;
        self
    }

    /// Replace the error callbacks
    pub fn with_error_handler(mut self, error_handler: ErrorCallbacks) -> Self {
        self.error_handler = error_handler;
        self
    }

    /// Set raw passthrough
    pub fn with_raw_response(mut self, raw_response: bool) -> Self {
        self.raw_response = raw_response;
        self
    }

    /// Set success codes
    pub fn with_success_codes(mut self, success_codes: Vec<i64>) -> Self {
        self.success_codes = success_codes;
        self
    }

    /// New options with `patch` applied.
    ///
    /// Scalars and the token store replace, success codes replace, error
    /// callbacks merge per category.
    pub fn merged(&self, patch: RequestOptionsPatch) -> RequestOptions {
        RequestOptions {
            base_url: patch.base_url.unwrap_or_else(|| self.base_url.clone()),
            timeout: patch.timeout.unwrap_or(self.timeout),
            token_store: patch
                .token_store
                .unwrap_or_else(|| self.token_store.clone()),
            error_handler: match &patch.error_handler {
                Some(callbacks) => self.error_handler.merged(callbacks),
                None => self.error_handler.clone(),
            },
            raw_response: patch.raw_response.unwrap_or(self.raw_response),
            success_codes: patch
                .success_codes
                .unwrap_or_else(|| self.success_codes.clone()),
        }
    }

    /// Reject malformed options
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(HttpError::InvalidConfig(
                "base URL must not be empty".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(HttpError::InvalidConfig(
                "timeout must be greater than 0".to_string(),
            ));
        }
        if self.success_codes.is_empty() {
            return Err(HttpError::InvalidConfig(
                "at least one success code is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("error_handler", &self.error_handler)
            .field("raw_response", &self.raw_response)
            .field("success_codes", &self.success_codes)
            .finish_non_exhaustive()
    }
}

/// Partial options accepted by [`HttpClient::configure`](crate::HttpClient::configure)
#[derive(Clone, Default)]
pub struct RequestOptionsPatch {
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub token_store: Option<Arc<dyn TokenStore>>,
    pub error_handler: Option<ErrorCallbacks>,
    pub raw_response: Option<bool>,
    pub success_codes: Option<Vec<i64>>,
}

impl RequestOptionsPatch {
    /// Empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the token store
    pub fn token_store(mut self, token_store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(token_store);
        self
    }

    /// Merge these callbacks into the current ones
    pub fn error_handler(mut self, callbacks: ErrorCallbacks) -> Self {
        self.error_handler = Some(callbacks);
        self
    }

    /// Set raw passthrough
    pub fn raw_response(mut self, raw_response: bool) -> Self {
        self.raw_response = Some(raw_response);
        self
    }

    /// Replace success codes
    pub fn success_codes(mut self, success_codes: Vec<i64>) -> Self {
        self.success_codes = Some(success_codes);
        self
    }
}
