use super::service_worker::ServiceWorkerManager;
use super::sync_manager::{SyncManager, SyncOutcome};
use crate::application::events::{AppEvent, EventBus};
use crate::application::ports::worker_host::{InstallChoice, InstallPrompt, WorkerHost};
use crate::domain::value_objects::SyncTrigger;
use crate::shared::error::AppError;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the host could provide at start-up. Each flag degrades on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PwaCapabilities {
    pub service_worker: bool,
    pub background_sync: bool,
    pub persistent_storage: bool,
    pub auto_sync: bool,
}

struct AutoSyncTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Wires host signals (connectivity, background sync, install prompt) to the
/// sync and worker managers. Constructed once and passed to whoever needs it.
pub struct PwaContext {
    sync: Arc<SyncManager>,
    worker: Arc<ServiceWorkerManager>,
    host: Arc<dyn WorkerHost>,
    events: EventBus,
    background_sync_tag: String,
    install_prompt: Mutex<Option<Box<dyn InstallPrompt>>>,
    auto_sync: Mutex<Option<AutoSyncTask>>,
}

impl PwaContext {
    pub fn new(
        sync: Arc<SyncManager>,
        worker: Arc<ServiceWorkerManager>,
        host: Arc<dyn WorkerHost>,
        events: EventBus,
    ) -> Self {
        let background_sync_tag = sync.config().background_sync_tag.clone();
        Self {
            sync,
            worker,
            host,
            events,
            background_sync_tag,
            install_prompt: Mutex::new(None),
            auto_sync: Mutex::new(None),
        }
    }

    pub fn sync_manager(&self) -> &Arc<SyncManager> {
        &self.sync
    }

    pub fn worker(&self) -> &Arc<ServiceWorkerManager> {
        &self.worker
    }

    pub async fn init(&self) -> PwaCapabilities {
        match self.sync.recover_interrupted().await {
            Ok(0) => {}
            Ok(recovered) => debug!(recovered, "interrupted sync items recovered"),
            Err(err) => warn!(error = %err, "failed to recover interrupted sync items"),
        }

        let service_worker = self.worker.register().await;
        let background_sync = self.register_background_sync().await;
        let persistent_storage = match self.host.request_persistent_storage().await {
            Ok(granted) => granted,
            Err(err) => {
                warn!(error = %err, "persistent storage request failed");
                false
            }
        };
        let auto_sync = self.start_auto_sync().await;

        let capabilities = PwaCapabilities {
            service_worker,
            background_sync,
            persistent_storage,
            auto_sync,
        };
        info!(?capabilities, "pwa initialised");

        if self.sync.is_online() {
            self.sync.sync_now(SyncTrigger::Online).await;
        }
        capabilities
    }

    async fn register_background_sync(&self) -> bool {
        if !self.host.supports_background_sync() {
            debug!("background sync not supported by host");
            return false;
        }
        match self
            .host
            .register_background_sync(&self.background_sync_tag)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, tag = %self.background_sync_tag, "background sync registration failed");
                false
            }
        }
    }

    async fn start_auto_sync(&self) -> bool {
        let mut task = self.auto_sync.lock().await;
        if task.is_some() {
            return true;
        }
        let (shutdown, receiver) = watch::channel(false);
        match self.sync.spawn_auto_sync(receiver) {
            Some(handle) => {
                *task = Some(AutoSyncTask { shutdown, handle });
                true
            }
            None => false,
        }
    }

    /// Stops scheduling new passes and waits for the scheduler to exit. A pass
    /// already running finishes first.
    pub async fn teardown(&self) {
        let Some(task) = self.auto_sync.lock().await.take() else {
            return;
        };
        let _ = task.shutdown.send(true);
        if let Err(err) = task.handle.await {
            warn!(error = %err, "auto sync task ended abnormally");
        }
        info!("pwa torn down");
    }

    pub async fn handle_connectivity(&self, online: bool) -> Option<SyncOutcome> {
        self.sync.set_online(online).await
    }

    /// Entry point for the host's background-sync wake-up.
    pub async fn handle_background_sync(&self, tag: &str) -> Option<SyncOutcome> {
        if tag != self.background_sync_tag {
            debug!(tag, "ignoring unrelated background sync");
            return None;
        }
        Some(self.sync.sync_now(SyncTrigger::BackgroundSync).await)
    }

    pub async fn capture_install_prompt(&self, prompt: Box<dyn InstallPrompt>) {
        *self.install_prompt.lock().await = Some(prompt);
        self.events.publish(AppEvent::InstallPromptAvailable);
    }

    pub async fn is_installable(&self) -> bool {
        self.install_prompt.lock().await.is_some()
    }

    /// Shows the captured prompt. The prompt is consumed whatever the answer;
    /// `None` when none was captured.
    pub async fn prompt_install(&self) -> Result<Option<InstallChoice>, AppError> {
        let Some(prompt) = self.install_prompt.lock().await.take() else {
            return Ok(None);
        };
        let choice = prompt.prompt().await?;
        let accepted = choice == InstallChoice::Accepted;
        info!(accepted, "install prompt resolved");
        self.events
            .publish(AppEvent::InstallPromptResolved { accepted });
        Ok(Some(choice))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }
}
