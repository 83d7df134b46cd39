//! Persisted alert opt-in state.

use std::sync::Arc;

use nimbus_store::FlagStore;

const ENABLED_KEY: &str = "alerts_enabled";
const PROMPTED_KEY: &str = "alerts_prompted";

/// User opt-in flags backed by the flag store.
///
/// Reads degrade to the safe default on store failure: alerts read as
/// disabled and the first-run prompt reads as not yet shown. Failures are
/// logged, never propagated.
#[derive(Clone)]
pub struct AlertSettings {
    store: Arc<dyn FlagStore>,
}

impl AlertSettings {
    pub fn new(store: Arc<dyn FlagStore>) -> Self {
        Self { store }
    }

    pub fn enabled(&self) -> bool {
        match self.store.get_bool(ENABLED_KEY) {
            Ok(enabled) => enabled,
            Err(e) => {
                tracing::warn!("Failed to read alert opt-in, treating as disabled: {}", e);
                false
            }
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        if let Err(e) = self.store.put_bool(ENABLED_KEY, enabled) {
            tracing::warn!("Failed to persist alert opt-in: {}", e);
        }
    }

    /// Whether the first-run prompt has already been shown.
    pub fn prompted_once(&self) -> bool {
        match self.store.get_bool(PROMPTED_KEY) {
            Ok(prompted) => prompted,
            Err(e) => {
                tracing::warn!("Failed to read prompt flag, treating as not shown: {}", e);
                false
            }
        }
    }

    pub fn mark_prompted(&self) {
        if let Err(e) = self.store.put_bool(PROMPTED_KEY, true) {
            tracing::warn!("Failed to persist prompt flag: {}", e);
        }
    }
}
