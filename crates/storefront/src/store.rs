//! Device-local persistence for the cart and wishlist collections.
//!
//! The in-memory collections held by the cart engine are the source of
//! truth; the local store is a best-effort mirror so they survive a reload.
//! Reads tolerate missing or corrupt values by hydrating an empty
//! collection, and writes never fail the mutation that triggered them - a
//! write error is logged and swallowed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Key under which the serialized cart collection is stored.
pub const CART_ITEMS_KEY: &str = "cartItems";

/// Key under which the serialized wishlist collection is stored.
pub const WISHLIST_ITEMS_KEY: &str = "wishlistItems";

/// Errors raised by a local store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A device-local key-value store holding string values.
pub trait LocalStore {
    /// Read the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the underlying read fails.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the underlying write fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Load a collection from the store, hydrating an empty one on any failure.
///
/// A missing key, a read error, and a corrupt value all produce an empty
/// collection; the latter two are logged at `warn`.
pub fn load_collection<T: DeserializeOwned>(store: &impl LocalStore, key: &str) -> Vec<T> {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                warn!(key, error = %err, "discarding corrupt local collection");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(err) => {
            warn!(key, error = %err, "failed to read local store");
            Vec::new()
        }
    }
}

/// Persist a collection to the store, swallowing any failure.
///
/// The in-memory mutation has already happened by the time this runs; a
/// failed write must not surface to the caller.
pub fn save_collection<T: Serialize>(store: &impl LocalStore, key: &str, items: &[T]) {
    let raw = match serde_json::to_string(items) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(key, error = %err, "failed to serialize local collection");
            return;
        }
    };
    if let Err(err) = store.set(key, &raw) {
        warn!(key, error = %err, "failed to persist local collection");
    }
}

/// File-backed store: one JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a file store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Ok(std::fs::write(self.path_for(key), value)?)
    }
}

/// In-memory store backed by a shared map.
///
/// Clones share the same map, which lets a test hand the "same device" to a
/// fresh engine instance to exercise hydration.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
