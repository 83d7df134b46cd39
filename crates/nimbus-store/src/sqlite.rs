//! SQLite-based flag storage implementation.
//!
//! This module provides `SqliteFlagStore`, a local SQLite implementation of
//! the `FlagStore` trait. One table of string key-value pairs; dedup markers
//! and opt-in flags share it.

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::flag_store::{FlagStore, StoreError, StoreResult};

/// SQLite-based flag storage.
///
/// The connection is guarded by a mutex so the store is `Sync` and can be
/// shared behind an `Arc<dyn FlagStore>`.
pub struct SqliteFlagStore {
    conn: Mutex<Connection>,
}

impl SqliteFlagStore {
    /// Create a new flag store at the given path.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory flag store (for testing).
    #[cfg(test)]
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS flags (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Number of stored flags.
    pub fn count(&self) -> anyhow::Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM flags", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl FlagStore for SqliteFlagStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value FROM flags WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| StoreError::storage(e.to_string()))
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        let updated_at = Utc::now().to_rfc3339();
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO flags (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, updated_at],
        )
        .map_err(|e| StoreError::storage(e.to_string()))?;

        tracing::debug!("Stored flag: {}", key);
        Ok(())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM flags WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::storage(e.to_string()))?;
        Ok(count > 0)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM flags WHERE key = ?1", params![key])
            .map_err(|e| StoreError::storage(e.to_string()))?;
        Ok(())
    }
}
