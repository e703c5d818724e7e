//! Bearer token storage
//!
//! Exactly one [`TokenStore`] is active per client. It is read on every
//! outgoing request, so a rotated token applies from the next request on.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{HttpError, Result};

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Token storage capability
pub trait TokenStore: Send + Sync {
    /// Read the current token, if any
    fn get_token(&self) -> Result<Option<String>>;

    /// Store a new token, replacing the old one
    fn set_token(&self, token: &str) -> Result<()>;

    /// Forget the stored token
    fn remove_token(&self) -> Result<()>;
}

/// In-process token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get_token(&self) -> Result<Option<String>> {
        Ok(self.token.read().clone())
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn remove_token(&self) -> Result<()> {
        *self.token.write() = None;
        Ok(())
    }
}

/// Persistent key-value file holding the token under [`TOKEN_KEY`].
///
/// The file is a flat JSON object of string values. Other keys in the file
/// are left untouched.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create a store at the default location
    pub fn with_default_path() -> Self {
        Self::new(Self::default_path())
    }

    /// `<data_local_dir>/readlog/storage.json`
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readlog")
            .join("storage.json")
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                HttpError::TokenStore(format!("corrupt storage file {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| HttpError::TokenStore(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get_token(&self) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(TOKEN_KEY))
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.save(&entries)?;
        debug!("Stored token in {}", self.path.display());
        Ok(())
    }

    fn remove_token(&self) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        if entries.remove(TOKEN_KEY).is_some() {
            self.save(&entries)?;
            debug!("Removed token from {}", self.path.display());
        }
        Ok(())
    }
}
