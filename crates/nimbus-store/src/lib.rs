//! Persisted key-value flag storage.
//!
//! Alert opt-in flags, the first-run prompt marker and per-day alert dedup
//! markers all live here as plain string values. Consumers depend on the
//! `FlagStore` trait so tests can swap in the in-memory implementation.

pub mod flag_store;
pub mod sqlite;

pub use flag_store::{FlagStore, MemoryFlagStore, StoreError, StoreResult};
pub use sqlite::SqliteFlagStore;
