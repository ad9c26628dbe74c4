use crate::application::events::{AppEvent, EventBus};
use crate::application::ports::worker_host::{WorkerHost, WorkerRegistration};
use crate::shared::config::ServiceWorkerConfig;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// The host has no service worker support.
    Unsupported,
    NotInstalled,
    Installed,
}

struct WorkerState {
    status: WorkerStatus,
    registration: Option<WorkerRegistration>,
    waiting_version: Option<String>,
    update_available: bool,
}

/// Registration and update lifecycle of the caching worker.
///
/// A waiting update is only announced; it is activated when the caller asks,
/// never automatically.
pub struct ServiceWorkerManager {
    host: Arc<dyn WorkerHost>,
    config: ServiceWorkerConfig,
    events: EventBus,
    state: Mutex<WorkerState>,
}

impl ServiceWorkerManager {
    pub fn new(host: Arc<dyn WorkerHost>, config: ServiceWorkerConfig, events: EventBus) -> Self {
        Self {
            host,
            config,
            events,
            state: Mutex::new(WorkerState {
                status: WorkerStatus::NotInstalled,
                registration: None,
                waiting_version: None,
                update_available: false,
            }),
        }
    }

    /// Registers the worker once. Unsupported hosts and host failures yield
    /// `false`; neither is an error for the caller.
    pub async fn register(&self) -> bool {
        {
            let mut state = self.state.lock().await;
            if state.registration.is_some() {
                return true;
            }
            if !self.host.supports_service_worker() {
                info!("service worker not supported by host");
                state.status = WorkerStatus::Unsupported;
                return false;
            }

            match self
                .host
                .register(&self.config.script_url, &self.config.scope)
                .await
            {
                Ok(registration) => {
                    info!(
                        scope = %registration.scope,
                        version = ?registration.active_version,
                        "service worker registered"
                    );
                    state.status = WorkerStatus::Installed;
                    state.registration = Some(registration);
                }
                Err(err) => {
                    error!(error = %err, script = %self.config.script_url, "service worker registration failed");
                    state.status = WorkerStatus::NotInstalled;
                    return false;
                }
            }
        }

        self.check_for_update().await;
        true
    }

    /// Asks the host whether a new worker is waiting. Returns whether an
    /// update is available afterwards.
    pub async fn check_for_update(&self) -> bool {
        let registration = self.state.lock().await.registration.clone();
        let Some(registration) = registration else {
            return false;
        };

        match self.host.waiting_version(&registration).await {
            Ok(Some(version)) => {
                self.notify_waiting(Some(version)).await;
                true
            }
            Ok(None) => self.is_update_available().await,
            Err(err) => {
                warn!(error = %err, "service worker update check failed");
                self.is_update_available().await
            }
        }
    }

    /// Records a worker in the waiting state and announces it once per version.
    pub async fn notify_waiting(&self, version: Option<String>) {
        let mut state = self.state.lock().await;
        if state.update_available && state.waiting_version == version {
            return;
        }
        info!(version = ?version, "service worker update available");
        state.update_available = true;
        state.waiting_version = version.clone();
        drop(state);

        self.events.publish(AppEvent::UpdateAvailable { version });
    }

    /// Activates the waiting worker and reloads. `false` when nothing is
    /// waiting or the host refused.
    pub async fn activate_update(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.update_available {
            debug!("no service worker update waiting");
            return false;
        }
        let Some(registration) = state.registration.clone() else {
            return false;
        };

        if let Err(err) = self.host.skip_waiting(&registration).await {
            error!(error = %err, "service worker activation failed");
            return false;
        }

        let version = state.waiting_version.take();
        state.update_available = false;
        if let Some(registration) = state.registration.as_mut() {
            registration.active_version = version.clone();
        }
        drop(state);

        info!(version = ?version, "service worker update activated");
        self.events.publish(AppEvent::UpdateActivated {
            version: version.clone(),
        });
        if let Err(err) = self.host.reload().await {
            warn!(error = %err, "reload after activation failed");
        }
        true
    }

    pub async fn status(&self) -> WorkerStatus {
        self.state.lock().await.status
    }

    pub async fn is_update_available(&self) -> bool {
        self.state.lock().await.update_available
    }

    pub async fn registration(&self) -> Option<WorkerRegistration> {
        self.state.lock().await.registration.clone()
    }
}
