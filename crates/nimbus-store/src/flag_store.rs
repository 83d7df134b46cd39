//! Flag storage trait and error types.
//!
//! This module defines the `FlagStore` trait that abstracts over different
//! storage implementations (SQLite on disk, in-memory for tests).

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during flag store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage error (database, filesystem).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

/// Result type for flag store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for persisted key-value flag storage.
///
/// Keys are derived strings (`alerts_enabled`, `alert_sent:{kind}:{city}:{day}`,
/// ...); values are plain strings with booleans stored as `"1"` / `"0"`.
/// Entries have no TTL — callers relying on day rollover encode the day into
/// the key.
pub trait FlagStore: Send + Sync {
    /// Get the value for a key, `None` if absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Set the value for a key, overwriting any previous value.
    fn put(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Check whether a key is present.
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Read a boolean flag; an absent key reads as `false`.
    fn get_bool(&self, key: &str) -> StoreResult<bool> {
        Ok(matches!(self.get(key)?.as_deref(), Some("1")))
    }

    /// Write a boolean flag as `"1"` / `"0"`.
    fn put_bool(&self, key: &str, value: bool) -> StoreResult<()> {
        self.put(key, if value { "1" } else { "0" })
    }
}

/// In-memory flag store.
///
/// Backs tests and acts as a fallback when no data directory is available.
/// Contents do not survive the process.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
