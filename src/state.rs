use crate::application::events::EventBus;
use crate::application::ports::worker_host::WorkerHost;
use crate::application::services::{
    PwaContext, RecordsService, ServiceWorkerManager, SyncManager,
};
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::http::{HttpRemoteApi, SessionStore};
use crate::infrastructure::offline::SqliteLocalStore;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::info;

/// Every long-lived component, built once from `AppConfig`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: ConnectionPool,
    pub events: EventBus,
    pub store: Arc<SqliteLocalStore>,
    pub session: Arc<SessionStore>,
    pub sync: Arc<SyncManager>,
    pub records: Arc<RecordsService>,
    pub worker: Arc<ServiceWorkerManager>,
    pub pwa: Arc<PwaContext>,
}

impl AppState {
    pub async fn initialize(
        config: AppConfig,
        host: Arc<dyn WorkerHost>,
        online: bool,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let pool =
            ConnectionPool::new(&config.database.url, config.database.max_connections).await?;
        pool.migrate().await?;

        let events = EventBus::default();
        let store = Arc::new(SqliteLocalStore::new(pool.get_pool().clone()));
        let session = Arc::new(SessionStore::from_config(&config.api, events.clone()));
        let remote = Arc::new(HttpRemoteApi::new(&config.api, Arc::clone(&session))?);

        let sync = Arc::new(SyncManager::new(
            store.clone(),
            remote,
            events.clone(),
            config.sync.clone(),
            online,
        ));
        let records = Arc::new(RecordsService::new(
            store.clone(),
            Arc::clone(&sync),
            config.student_id.clone(),
        ));
        let worker = Arc::new(ServiceWorkerManager::new(
            Arc::clone(&host),
            config.service_worker.clone(),
            events.clone(),
        ));
        let pwa = Arc::new(PwaContext::new(
            Arc::clone(&sync),
            Arc::clone(&worker),
            host,
            events.clone(),
        ));

        info!(database = %config.database.url, api = %config.api.base_url, "application state ready");

        Ok(Self {
            config: Arc::new(config),
            pool,
            events,
            store,
            session,
            sync,
            records,
            worker,
            pwa,
        })
    }

    pub async fn shutdown(&self) {
        self.pwa.teardown().await;
        self.pool.close().await;
    }
}
