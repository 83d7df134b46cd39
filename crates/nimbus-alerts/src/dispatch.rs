//! Notification delivery: native when possible, in-app toast otherwise.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::policy::AlertNotice;
use crate::settings::AlertSettings;

/// Platform notification permission, tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Unknown,
    Granted,
    Denied,
}

#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Platform notification facility.
#[async_trait]
pub trait NotificationBackend: Send + Sync {
    /// Whether this platform has a native notification facility at all.
    fn is_supported(&self) -> bool;
    fn permission(&self) -> Permission;
    /// Show the platform permission dialog and report its outcome.
    async fn request_permission(&self) -> Permission;
    async fn deliver(&self, notice: &AlertNotice) -> Result<(), DeliveryError>;
}

/// Backend for builds without a native notification facility.
pub struct UnsupportedBackend;

#[async_trait]
impl NotificationBackend for UnsupportedBackend {
    fn is_supported(&self) -> bool {
        false
    }

    fn permission(&self) -> Permission {
        Permission::Unknown
    }

    async fn request_permission(&self) -> Permission {
        Permission::Unknown
    }

    async fn deliver(&self, _notice: &AlertNotice) -> Result<(), DeliveryError> {
        Err(DeliveryError("native notifications unavailable".to_string()))
    }
}

/// Toasts auto-dismiss after this many milliseconds unless sticky.
pub const TOAST_TTL_MS: u64 = 6500;

/// In-app ephemeral notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub body: String,
    pub actions: Vec<String>,
    /// 0 keeps the toast on screen until a button is clicked.
    pub ttl_ms: u64,
}

impl Toast {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            actions: Vec::new(),
            ttl_ms: TOAST_TTL_MS,
        }
    }

    /// A toast carrying actions persists until one is clicked.
    pub fn with_actions(
        title: impl Into<String>,
        body: impl Into<String>,
        actions: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            actions,
            ttl_ms: 0,
        }
    }

    pub fn is_sticky(&self) -> bool {
        self.ttl_ms == 0
    }
}

/// Where toasts end up. `push` returns false when nothing was displayed.
pub trait ToastSink: Send + Sync {
    fn push(&self, toast: Toast) -> bool;
}

/// How a notice reached the user, if it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Native,
    Toast,
    Suppressed,
}

/// Result of an enable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableOutcome {
    /// No native facility; alerts enabled for in-app delivery only.
    EnabledInApp,
    /// Enabled with native notifications available.
    EnabledNative,
    /// Permission denied at the platform level; not enabled.
    Blocked,
    /// User dismissed the permission dialog; not enabled.
    Declined,
}

/// Routes notices to the backend or the toast sink based on opt-in state,
/// platform capability and permission.
pub struct NotificationDispatcher {
    settings: AlertSettings,
    backend: Arc<dyn NotificationBackend>,
    sink: Arc<dyn ToastSink>,
}

impl NotificationDispatcher {
    pub fn new(
        settings: AlertSettings,
        backend: Arc<dyn NotificationBackend>,
        sink: Arc<dyn ToastSink>,
    ) -> Self {
        Self { settings, backend, sink }
    }

    /// Deliver one notice. Native delivery requires opt-in, capability and
    /// granted permission together; a failed native attempt falls back to a
    /// toast rather than dropping the notice.
    #[instrument(skip(self, notice), level = "info")]
    pub async fn dispatch(&self, notice: &AlertNotice) -> Delivery {
        if self.settings.enabled()
            && self.backend.is_supported()
            && self.backend.permission() == Permission::Granted
        {
            match self.backend.deliver(notice).await {
                Ok(()) => {
                    tracing::info!("Delivered natively: {}", notice.tag);
                    return Delivery::Native;
                }
                Err(e) => {
                    tracing::warn!("Native delivery failed, falling back to toast: {}", e);
                }
            }
        }

        if self.sink.push(Toast::new(&notice.title, &notice.body)) {
            Delivery::Toast
        } else {
            tracing::warn!("Toast sink dropped notice: {}", notice.tag);
            Delivery::Suppressed
        }
    }

    /// Turn alerts on, negotiating platform permission as needed.
    #[instrument(skip(self), level = "info")]
    pub async fn request_enable(&self) -> EnableOutcome {
        if !self.backend.is_supported() {
            // No native facility to ask; enable optimistically for in-app
            self.settings.set_enabled(true);
            self.sink.push(Toast::new(
                "Alerts enabled",
                "Native notifications are unavailable here; alerts will show in-app.",
            ));
            return EnableOutcome::EnabledInApp;
        }

        match self.backend.permission() {
            Permission::Granted => {
                self.settings.set_enabled(true);
                self.sink.push(Toast::new(
                    "Alerts enabled",
                    "Weather alerts will use system notifications.",
                ));
                EnableOutcome::EnabledNative
            }
            Permission::Denied => {
                self.sink.push(Toast::new(
                    "Notifications blocked",
                    "Notifications are blocked at the platform level. Allow them in system settings first.",
                ));
                EnableOutcome::Blocked
            }
            Permission::Unknown => match self.backend.request_permission().await {
                Permission::Granted => {
                    self.settings.set_enabled(true);
                    self.sink.push(Toast::new(
                        "Alerts enabled",
                        "Weather alerts will use system notifications.",
                    ));
                    EnableOutcome::EnabledNative
                }
                Permission::Denied | Permission::Unknown => {
                    self.settings.set_enabled(false);
                    self.sink.push(Toast::new(
                        "Alerts not enabled",
                        "Notification permission was not granted.",
                    ));
                    EnableOutcome::Declined
                }
            },
        }
    }

    /// Turn alerts off. Always succeeds regardless of permission state.
    pub fn disable(&self) {
        self.settings.set_enabled(false);
        self.sink.push(Toast::new(
            "Alerts disabled",
            "You will no longer receive weather alerts.",
        ));
        tracing::info!("Alerts disabled");
    }

    /// Offer to enable alerts, at most once per installation.
    ///
    /// Gated by a persisted flag separate from the opt-in itself, so
    /// declining the offer never re-prompts. Returns whether the prompt was
    /// shown.
    pub fn prompt_first_run(&self) -> bool {
        if self.settings.prompted_once() {
            return false;
        }
        self.settings.mark_prompted();
        self.sink.push(Toast::with_actions(
            "Enable weather alerts?",
            "Get a heads-up for rain, heat, cold and storms in your city.",
            vec!["Enable".to_string(), "Not now".to_string()],
        ));
        true
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::policy::AlertKind;
    use nimbus_store::MemoryFlagStore;
    use parking_lot::Mutex;

    struct ScriptedBackend {
        supported: bool,
        permission: Permission,
        dialog_response: Permission,
        fail_delivery: bool,
        delivered: Mutex<Vec<String>>,
        dialogs_shown: Mutex<u32>,
    }

    impl ScriptedBackend {
        fn new(supported: bool, permission: Permission) -> Self {
            Self {
                supported,
                permission,
                dialog_response: Permission::Unknown,
                fail_delivery: false,
                delivered: Mutex::new(Vec::new()),
                dialogs_shown: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl NotificationBackend for ScriptedBackend {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn permission(&self) -> Permission {
            self.permission
        }

        async fn request_permission(&self) -> Permission {
            *self.dialogs_shown.lock() += 1;
            self.dialog_response
        }

        async fn deliver(&self, notice: &AlertNotice) -> Result<(), DeliveryError> {
            if self.fail_delivery {
                return Err(DeliveryError("backend exploded".to_string()));
            }
            self.delivered.lock().push(notice.tag.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        toasts: Mutex<Vec<Toast>>,
    }

    impl ToastSink for RecordingSink {
        fn push(&self, toast: Toast) -> bool {
            self.toasts.lock().push(toast);
            true
        }
    }

    struct DroppingSink;

    impl ToastSink for DroppingSink {
        fn push(&self, _toast: Toast) -> bool {
            false
        }
    }

    fn notice() -> AlertNotice {
        AlertNotice {
            kind: AlertKind::Heat,
            title: "Heat warning: Tirupati, India".to_string(),
            body: "Day max around 39°C. Stay hydrated and avoid peak sun.".to_string(),
            tag: "heat-tirupati|india-2026-08-25".to_string(),
        }
    }

    fn dispatcher(
        backend: Arc<ScriptedBackend>,
        sink: Arc<RecordingSink>,
        enabled: bool,
    ) -> NotificationDispatcher {
        let settings = AlertSettings::new(Arc::new(MemoryFlagStore::new()));
        settings.set_enabled(enabled);
        NotificationDispatcher::new(settings, backend, sink)
    }

    #[tokio::test]
    async fn test_native_delivery_when_fully_permitted() {
        let backend = Arc::new(ScriptedBackend::new(true, Permission::Granted));
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher(backend.clone(), sink.clone(), true);

        assert_eq!(dispatcher.dispatch(&notice()).await, Delivery::Native);
        assert_eq!(backend.delivered.lock().len(), 1);
        assert!(sink.toasts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failed_native_falls_back_to_toast() {
        let mut backend = ScriptedBackend::new(true, Permission::Granted);
        backend.fail_delivery = true;
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher(Arc::new(backend), sink.clone(), true);

        assert_eq!(dispatcher.dispatch(&notice()).await, Delivery::Toast);
        let toasts = sink.toasts.lock();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].title, "Heat warning: Tirupati, India");
        assert_eq!(toasts[0].ttl_ms, TOAST_TTL_MS);
    }

    #[tokio::test]
    async fn test_disabled_goes_to_toast_even_when_granted() {
        let backend = Arc::new(ScriptedBackend::new(true, Permission::Granted));
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher(backend.clone(), sink.clone(), false);

        assert_eq!(dispatcher.dispatch(&notice()).await, Delivery::Toast);
        assert!(backend.delivered.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_permission_goes_to_toast() {
        let backend = Arc::new(ScriptedBackend::new(true, Permission::Unknown));
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher(backend, sink, true);

        assert_eq!(dispatcher.dispatch(&notice()).await, Delivery::Toast);
    }

    #[tokio::test]
    async fn test_dropped_toast_reports_suppressed() {
        let settings = AlertSettings::new(Arc::new(MemoryFlagStore::new()));
        let dispatcher = NotificationDispatcher::new(
            settings,
            Arc::new(ScriptedBackend::new(false, Permission::Unknown)),
            Arc::new(DroppingSink),
        );

        assert_eq!(dispatcher.dispatch(&notice()).await, Delivery::Suppressed);
    }

    #[tokio::test]
    async fn test_enable_without_capability_is_optimistic() {
        let settings = AlertSettings::new(Arc::new(MemoryFlagStore::new()));
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(
            settings.clone(),
            Arc::new(ScriptedBackend::new(false, Permission::Unknown)),
            sink.clone(),
        );

        assert_eq!(dispatcher.request_enable().await, EnableOutcome::EnabledInApp);
        assert!(settings.enabled());
        assert_eq!(sink.toasts.lock()[0].title, "Alerts enabled");
    }

    #[tokio::test]
    async fn test_enable_with_granted_permission() {
        let settings = AlertSettings::new(Arc::new(MemoryFlagStore::new()));
        let backend = Arc::new(ScriptedBackend::new(true, Permission::Granted));
        let dispatcher = NotificationDispatcher::new(
            settings.clone(),
            backend.clone(),
            Arc::new(RecordingSink::default()),
        );

        assert_eq!(dispatcher.request_enable().await, EnableOutcome::EnabledNative);
        assert!(settings.enabled());
        // Already granted, no dialog needed
        assert_eq!(*backend.dialogs_shown.lock(), 0);
    }

    #[tokio::test]
    async fn test_enable_with_denied_permission_does_not_enable() {
        let settings = AlertSettings::new(Arc::new(MemoryFlagStore::new()));
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(
            settings.clone(),
            Arc::new(ScriptedBackend::new(true, Permission::Denied)),
            sink.clone(),
        );

        assert_eq!(dispatcher.request_enable().await, EnableOutcome::Blocked);
        assert!(!settings.enabled());
        assert_eq!(sink.toasts.lock()[0].title, "Notifications blocked");
    }

    #[tokio::test]
    async fn test_enable_with_unknown_permission_prompts_dialog() {
        let settings = AlertSettings::new(Arc::new(MemoryFlagStore::new()));
        let mut backend = ScriptedBackend::new(true, Permission::Unknown);
        backend.dialog_response = Permission::Granted;
        let backend = Arc::new(backend);
        let dispatcher = NotificationDispatcher::new(
            settings.clone(),
            backend.clone(),
            Arc::new(RecordingSink::default()),
        );

        assert_eq!(dispatcher.request_enable().await, EnableOutcome::EnabledNative);
        assert!(settings.enabled());
        assert_eq!(*backend.dialogs_shown.lock(), 1);
    }

    #[tokio::test]
    async fn test_declined_dialog_leaves_alerts_off() {
        let settings = AlertSettings::new(Arc::new(MemoryFlagStore::new()));
        settings.set_enabled(true);
        let mut backend = ScriptedBackend::new(true, Permission::Unknown);
        backend.dialog_response = Permission::Denied;
        let dispatcher = NotificationDispatcher::new(
            settings.clone(),
            Arc::new(backend),
            Arc::new(RecordingSink::default()),
        );

        assert_eq!(dispatcher.request_enable().await, EnableOutcome::Declined);
        // The dialog outcome overwrites the previous opt-in
        assert!(!settings.enabled());
    }

    #[tokio::test]
    async fn test_disable_is_unconditional() {
        let settings = AlertSettings::new(Arc::new(MemoryFlagStore::new()));
        settings.set_enabled(true);
        let dispatcher = NotificationDispatcher::new(
            settings.clone(),
            Arc::new(ScriptedBackend::new(true, Permission::Denied)),
            Arc::new(RecordingSink::default()),
        );

        dispatcher.disable();
        assert!(!settings.enabled());
    }

    #[test]
    fn test_first_run_prompt_shows_once() {
        let settings = AlertSettings::new(Arc::new(MemoryFlagStore::new()));
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = NotificationDispatcher::new(
            settings,
            Arc::new(UnsupportedBackend),
            sink.clone(),
        );

        assert!(dispatcher.prompt_first_run());
        assert!(!dispatcher.prompt_first_run());
        assert!(!dispatcher.prompt_first_run());

        let toasts = sink.toasts.lock();
        assert_eq!(toasts.len(), 1);
        assert!(toasts[0].is_sticky());
        assert_eq!(toasts[0].actions, vec!["Enable", "Not now"]);
    }

    #[test]
    fn test_plain_toast_is_not_sticky() {
        assert!(!Toast::new("t", "b").is_sticky());
        assert!(Toast::with_actions("t", "b", vec!["Ok".to_string()]).is_sticky());
    }
}
