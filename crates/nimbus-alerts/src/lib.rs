//! Threshold alerts: rule evaluation, once-per-day dedup, opt-in state and
//! notification delivery.
//!
//! The pipeline is policy -> dedup -> dispatch. `AlertPolicy` turns one
//! forecast day into candidate notices, `DedupLedger` lets each (kind, city,
//! day) through exactly once, and `NotificationDispatcher` picks native
//! delivery or an in-app toast based on the opt-in and permission state.

pub mod dedup;
pub mod dispatch;
pub mod policy;
pub mod settings;

pub use dedup::{DedupKey, DedupLedger};
pub use dispatch::{
    Delivery, DeliveryError, EnableOutcome, NotificationBackend, NotificationDispatcher,
    Permission, Toast, ToastSink, UnsupportedBackend,
};
pub use policy::{city_key, AlertKind, AlertNotice, AlertPolicy, AlertThresholds};
pub use settings::AlertSettings;
