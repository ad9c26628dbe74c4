use crate::domain::entities::{SyncReport, SyncSnapshot};
use crate::domain::value_objects::SyncTrigger;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 64;

/// Notifications published to UI consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum AppEvent {
    NetworkChanged { online: bool },
    SyncStarted { trigger: SyncTrigger },
    SyncCompleted(SyncReport),
    SyncStatusChanged(SyncSnapshot),
    UpdateAvailable { version: Option<String> },
    UpdateActivated { version: Option<String> },
    InstallPromptAvailable,
    InstallPromptResolved { accepted: bool },
    /// Credentials were rejected and cleared; the UI should return to sign-in.
    SessionExpired,
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::NetworkChanged { .. } => "network_changed",
            AppEvent::SyncStarted { .. } => "sync_started",
            AppEvent::SyncCompleted(_) => "sync_completed",
            AppEvent::SyncStatusChanged(_) => "sync_status_changed",
            AppEvent::UpdateAvailable { .. } => "update_available",
            AppEvent::UpdateActivated { .. } => "update_activated",
            AppEvent::InstallPromptAvailable => "install_prompt_available",
            AppEvent::InstallPromptResolved { .. } => "install_prompt_resolved",
            AppEvent::SessionExpired => "session_expired",
        }
    }
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: AppEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => trace!(event = name, receivers, "event published"),
            // No subscriber yet; nothing to deliver.
            Err(_) => trace!(event = name, "event dropped without subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
