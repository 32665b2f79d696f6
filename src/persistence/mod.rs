//! Key-value persistence
//!
//! Features:
//! - `Storage` trait mirroring the browser LocalStorage API
//! - LocalStorage backend (wasm32 only)
//! - In-memory backend for native runs and tests
//! - JSON helpers that treat malformed records as absent

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Settings record key
pub const SETTINGS_KEY: &str = "capybaraSettings";
/// Top scores record key
pub const SCORES_KEY: &str = "capybaraScores";
/// Recent match history record key
pub const HISTORY_KEY: &str = "capybaraHistory";

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage is not available (private browsing, no window, quota disabled)
    #[error("storage unavailable")]
    Unavailable,
    /// The backend rejected the operation
    #[error("storage backend error: {0}")]
    Backend(String),
    /// A record could not be encoded
    #[error("failed to encode record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value store
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Read a JSON record. Missing, unreadable or malformed records yield `None`.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let json = match storage.get_item(key) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Could not read {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring malformed {} record: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON record in a single `set_item` call.
pub fn save_json<T: Serialize + ?Sized>(
    storage: &mut dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    storage.set_item(key, &json)
}

/// In-memory storage (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails, like LocalStorage with storage disabled
    pub fn unavailable() -> Self {
        Self {
            items: BTreeMap::new(),
            unavailable: true,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.items.remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// Open the window's LocalStorage. Never fails; a missing store reports
    /// `Unavailable` on use.
    pub fn open() -> Self {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if inner.is_none() {
            log::warn!("LocalStorage unavailable - progress will not be saved");
        }
        Self { inner }
    }

    fn store(&self) -> Result<&web_sys::Storage, StorageError> {
        self.inner.as_ref().ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.store()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store()?
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.store()?
            .remove_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").unwrap(), None);

        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));

        storage.remove_item("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_unavailable_storage_errors() {
        let mut storage = MemoryStorage::unavailable();
        assert!(matches!(storage.get_item("k"), Err(StorageError::Unavailable)));
        assert!(storage.set_item("k", "v").is_err());
        assert!(storage.remove_item("k").is_err());
    }

    #[test]
    fn test_load_json_ignores_malformed() {
        let mut storage = MemoryStorage::new();
        storage.set_item("nums", "[1, 2,").unwrap();
        assert_eq!(load_json::<Vec<u32>>(&storage, "nums"), None);

        save_json(&mut storage, "nums", &vec![1u32, 2]).unwrap();
        assert_eq!(load_json::<Vec<u32>>(&storage, "nums"), Some(vec![1, 2]));
    }

    #[test]
    fn test_load_json_when_unavailable() {
        let storage = MemoryStorage::unavailable();
        assert_eq!(load_json::<Vec<u32>>(&storage, "nums"), None);
    }
}
