//! Once-per-day gate in front of notification delivery.

use std::sync::Arc;

use chrono::NaiveDate;
use nimbus_store::{FlagStore, StoreError};

use crate::policy::AlertKind;

/// Identity of one alert occasion. Day rollover is encoded in the key, so
/// entries never need expiry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub kind: AlertKind,
    pub city_key: String,
    pub day: NaiveDate,
}

impl DedupKey {
    pub fn new(kind: AlertKind, city_key: impl Into<String>, day: NaiveDate) -> Self {
        Self { kind, city_key: city_key.into(), day }
    }

    /// Flag-store key, e.g. `alert_sent:rain:tirupati|india:2026-08-25`.
    pub fn storage_key(&self) -> String {
        format!(
            "alert_sent:{}:{}:{}",
            self.kind.as_str(),
            self.city_key,
            self.day.format("%Y-%m-%d")
        )
    }
}

/// Persistent record of which alerts have already gone out.
#[derive(Clone)]
pub struct DedupLedger {
    store: Arc<dyn FlagStore>,
}

impl DedupLedger {
    pub fn new(store: Arc<dyn FlagStore>) -> Self {
        Self { store }
    }

    /// True exactly once per key; every later call returns false.
    ///
    /// Check and mark run back to back with no await point between them, so
    /// repeated evaluations of the same forecast cannot double-send.
    pub fn first_dispatch(&self, key: &DedupKey) -> Result<bool, StoreError> {
        let storage_key = key.storage_key();
        if self.store.exists(&storage_key)? {
            tracing::debug!("Alert already sent, suppressing: {}", storage_key);
            return Ok(false);
        }
        self.store.put_bool(&storage_key, true)?;
        Ok(true)
    }
}
