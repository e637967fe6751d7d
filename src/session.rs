//! Client session storage.
//!
//! Auth and wallet state lives under a handful of string keys behind
//! [`KeyValueStore`]; [`Session`] gives typed access to them. Writes are
//! last-write-wins.

use crate::errors::AppError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const TOKEN_KEY: &str = "token";
pub const BASENAME_KEY: &str = "userBasename";
pub const WALLET_PRIVATE_KEY_KEY: &str = "smartWalletPrivateKey";
pub const WALLET_ADDRESS_KEY: &str = "smartWalletAddress";
pub const THEME_KEY: &str = "theme";

/// String key-value storage shared by everything holding the session.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Volatile store, discarded with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .map_err(|_| AppError::Storage("session lock poisoned".to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .map_err(|_| AppError::Storage("session lock poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}

/// Store persisted as a flat JSON object, rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::Storage(format!("Corrupt session file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "Session file {} opened with {} key(s)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::Storage("session lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::Storage("session lock poisoned".to_string()))?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// Cheaply cloneable handle over the session keys.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn token(&self) -> Option<String> {
        self.non_empty(TOKEN_KEY)
    }

    pub fn set_token(&self, token: &str) -> Result<(), AppError> {
        self.store.set(TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<(), AppError> {
        self.store.remove(TOKEN_KEY)
    }

    pub fn basename(&self) -> Option<String> {
        self.non_empty(BASENAME_KEY)
    }

    pub fn set_basename(&self, basename: &str) -> Result<(), AppError> {
        self.store.set(BASENAME_KEY, basename)
    }

    pub fn wallet_address(&self) -> Option<String> {
        self.non_empty(WALLET_ADDRESS_KEY)
    }

    pub fn wallet_private_key(&self) -> Option<String> {
        self.non_empty(WALLET_PRIVATE_KEY_KEY)
    }

    /// Persists a freshly generated wallet.
    pub fn set_wallet(&self, address: &str, private_key: &str) -> Result<(), AppError> {
        self.store.set(WALLET_PRIVATE_KEY_KEY, private_key)?;
        self.store.set(WALLET_ADDRESS_KEY, address)
    }

    pub fn theme(&self) -> Option<String> {
        self.non_empty(THEME_KEY)
    }

    pub fn set_theme(&self, theme: &str) -> Result<(), AppError> {
        self.store.set(THEME_KEY, theme)
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.store.get(key).filter(|v| !v.is_empty())
    }
}
