use super::sync_metrics::{SyncMetrics, SyncMetricsSnapshot};
use crate::application::events::{AppEvent, EventBus};
use crate::application::ports::local_store::LocalStore;
use crate::application::ports::remote_api::{ApiError, RemoteApi};
use crate::domain::entities::{SyncQueueItem, SyncQueueItemDraft, SyncReport, SyncSnapshot};
use crate::domain::value_objects::{
    SyncEntity, SyncItemState, SyncOperation, SyncPayload, SyncTrigger,
};
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Completed(SyncReport),
    /// Another pass held the guard; nothing was done.
    AlreadyRunning,
    Offline,
    Aborted { reason: String, report: SyncReport },
}

impl SyncOutcome {
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            SyncOutcome::Completed(report) | SyncOutcome::Aborted { report, .. } => Some(report),
            SyncOutcome::AlreadyRunning | SyncOutcome::Offline => None,
        }
    }
}

/// Releases the single-pass guard however the pass ends.
struct PassGuard<'a>(&'a AtomicBool);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

enum ItemResult {
    Synced,
    Retried,
    Failed,
    SessionExpired,
}

pub struct SyncManager {
    store: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteApi>,
    events: EventBus,
    config: SyncConfig,
    online: AtomicBool,
    in_progress: AtomicBool,
    last_sync: RwLock<Option<DateTime<Utc>>>,
    metrics: SyncMetrics,
}

impl SyncManager {
    pub fn new(
        store: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteApi>,
        events: EventBus,
        config: SyncConfig,
        online: bool,
    ) -> Self {
        Self {
            store,
            remote,
            events,
            config,
            online: AtomicBool::new(online),
            in_progress: AtomicBool::new(false),
            last_sync: RwLock::new(None),
            metrics: SyncMetrics::new(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub fn is_syncing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// State new queue items start in, given current connectivity.
    pub fn enqueue_state(&self) -> SyncItemState {
        if self.is_online() {
            SyncItemState::Queued
        } else {
            SyncItemState::Offline
        }
    }

    pub fn prepare_change(
        &self,
        operation: SyncOperation,
        entity: SyncEntity,
        entity_id: impl Into<String>,
        payload: SyncPayload,
    ) -> SyncQueueItemDraft {
        SyncQueueItemDraft::new(operation, entity, entity_id, payload)
            .with_initial_state(self.enqueue_state())
            .with_max_retries(self.config.max_retry)
    }

    /// Called after a local mutation landed in the queue.
    pub async fn notify_enqueued(&self, item: &SyncQueueItem) {
        debug!(
            item_id = %item.id,
            entity = item.entity.as_str(),
            state = item.state.as_str(),
            "local change queued"
        );
        self.publish_status().await;
    }

    /// Records connectivity. Coming back online promotes offline items and
    /// runs a pass; the outcome of that pass is returned.
    pub async fn set_online(&self, online: bool) -> Option<SyncOutcome> {
        let was_online = self.online.swap(online, Ordering::AcqRel);
        if was_online == online {
            return None;
        }

        info!(online, "network status changed");
        self.events.publish(AppEvent::NetworkChanged { online });

        if !online {
            self.publish_status().await;
            return None;
        }

        match self.store.promote_offline_items().await {
            Ok(promoted) if promoted > 0 => debug!(promoted, "offline items queued"),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "failed to promote offline items"),
        }
        Some(self.sync_now(SyncTrigger::Online).await)
    }

    pub async fn sync_now(&self, trigger: SyncTrigger) -> SyncOutcome {
        if !self.is_online() {
            debug!(%trigger, "sync skipped while offline");
            return SyncOutcome::Offline;
        }
        let Some(guard) = PassGuard::acquire(&self.in_progress) else {
            debug!(%trigger, "sync already in progress");
            return SyncOutcome::AlreadyRunning;
        };

        info!(%trigger, "sync pass started");
        self.events.publish(AppEvent::SyncStarted { trigger });

        let mut report = SyncReport::new(trigger, Utc::now());
        let replay = self.replay(&mut report).await;
        report.finished_at = Utc::now();

        let outcome = match replay {
            Ok(None) => SyncOutcome::Completed(report.clone()),
            Ok(Some(reason)) => SyncOutcome::Aborted {
                reason,
                report: report.clone(),
            },
            Err(err) => {
                error!(error = %err, %trigger, "sync pass failed");
                SyncOutcome::Aborted {
                    reason: err.to_string(),
                    report: report.clone(),
                }
            }
        };
        let aborted = matches!(outcome, SyncOutcome::Aborted { .. });

        self.metrics.record(&report, aborted);
        if !aborted {
            *self.last_sync.write().await = Some(report.finished_at);
        }
        info!(
            %trigger,
            attempted = report.attempted,
            synced = report.synced,
            retried = report.retried,
            failed = report.failed,
            deferred = report.deferred,
            duration_ms = report.duration_ms(),
            aborted,
            "sync pass finished"
        );

        drop(guard);
        self.events.publish(AppEvent::SyncCompleted(report));
        self.publish_status().await;
        outcome
    }

    /// Replays up to `batch_size` attempts. Items deferred behind a failed
    /// change of the same record do not use up the batch, so the queue is
    /// paged past them. Returns the abort reason when the session expired.
    async fn replay(&self, report: &mut SyncReport) -> Result<Option<String>, AppError> {
        let page_size = self.config.batch_size.max(1);
        let mut budget = page_size;
        let mut cursor = None;
        let mut blocked: HashSet<(SyncEntity, String)> = HashSet::new();

        while budget > 0 {
            let items = self.store.pending_items_after(cursor, page_size).await?;
            let Some(last) = items.last() else {
                break;
            };
            cursor = Some(last.id);
            let exhausted_queue = items.len() < page_size as usize;

            for item in items {
                if budget == 0 {
                    break;
                }
                let key = item.entity_key();
                if blocked.contains(&key) {
                    report.deferred += 1;
                    continue;
                }

                budget -= 1;
                report.attempted += 1;
                match self.push_item(&item).await? {
                    ItemResult::Synced => report.synced += 1,
                    ItemResult::Retried => {
                        report.retried += 1;
                        blocked.insert(key);
                    }
                    ItemResult::Failed => {
                        report.failed += 1;
                        blocked.insert(key);
                    }
                    ItemResult::SessionExpired => {
                        return Ok(Some("remote session expired".to_string()));
                    }
                }
            }

            if exhausted_queue {
                break;
            }
        }
        Ok(None)
    }

    async fn push_item(&self, item: &SyncQueueItem) -> Result<ItemResult, AppError> {
        self.store
            .transition_item(item.id, SyncItemState::Syncing, None)
            .await?;

        match self.remote.push(item).await {
            Ok(ack) => {
                self.store
                    .transition_item(item.id, SyncItemState::Synced, None)
                    .await?;
                self.store
                    .mark_entity_synced(item.entity, &item.entity_id, Utc::now())
                    .await?;
                debug!(item_id = %item.id, remote_id = ?ack.remote_id, "sync item confirmed");
                Ok(ItemResult::Synced)
            }
            Err(ApiError::Unauthorized) => {
                self.store
                    .release_item(item.id, Some(ApiError::Unauthorized.to_string()))
                    .await?;
                warn!(item_id = %item.id, "sync aborted: session expired");
                Ok(ItemResult::SessionExpired)
            }
            Err(err) => {
                let attempts = item.retry_count.saturating_add(1);
                let message = err.to_string();
                if err.is_retryable() && !item.last_attempt() {
                    warn!(
                        item_id = %item.id,
                        attempts,
                        max_retries = item.max_retries,
                        error = %message,
                        "sync item will be retried"
                    );
                    self.store
                        .transition_item(item.id, SyncItemState::Queued, Some(message))
                        .await?;
                    Ok(ItemResult::Retried)
                } else {
                    error!(
                        item_id = %item.id,
                        entity = item.entity.as_str(),
                        entity_id = %item.entity_id,
                        attempts,
                        error = %message,
                        "sync item failed"
                    );
                    self.store
                        .transition_item(item.id, SyncItemState::Failed, Some(message))
                        .await?;
                    Ok(ItemResult::Failed)
                }
            }
        }
    }

    pub async fn snapshot(&self) -> Result<SyncSnapshot, AppError> {
        Ok(SyncSnapshot {
            online: self.is_online(),
            sync_in_progress: self.is_syncing(),
            unsynced_count: self.store.unsynced_count().await?,
            queue_count: self.store.queue_count().await?,
            failed_count: self.store.failed_count().await?,
            last_sync: *self.last_sync.read().await,
        })
    }

    async fn publish_status(&self) {
        match self.snapshot().await {
            Ok(snapshot) => self.events.publish(AppEvent::SyncStatusChanged(snapshot)),
            Err(err) => warn!(error = %err, "failed to read sync status"),
        }
    }

    pub async fn recover_interrupted(&self) -> Result<u64, AppError> {
        self.store.recover_interrupted().await
    }

    pub async fn failed_items(&self) -> Result<Vec<SyncQueueItem>, AppError> {
        self.store.failed_items().await
    }

    pub async fn retry_failed(&self) -> Result<u64, AppError> {
        let requeued = self.store.retry_failed().await?;
        if requeued > 0 {
            info!(requeued, "failed sync items requeued");
        }
        self.publish_status().await;
        Ok(requeued)
    }

    pub async fn purge_synced(&self, older_than: ChronoDuration) -> Result<u64, AppError> {
        let purged = self.store.purge_synced(Utc::now() - older_than).await?;
        debug!(purged, "confirmed sync items purged");
        Ok(purged)
    }

    pub fn metrics(&self) -> SyncMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Runs interval passes until `shutdown` flips to `true` or its sender is
    /// dropped. Returns `None` when auto sync is disabled.
    pub fn spawn_auto_sync(
        self: &Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Option<JoinHandle<()>> {
        if !self.config.auto_sync {
            info!("auto sync disabled");
            return None;
        }

        let manager = Arc::clone(self);
        let period = Duration::from_secs(self.config.sync_interval.max(1));
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick fires immediately; start-up already runs a pass.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let SyncOutcome::Aborted { reason, .. } =
                            manager.sync_now(SyncTrigger::Interval).await
                        {
                            warn!(%reason, "scheduled sync aborted");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("auto sync stopped");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::remote_api::RemoteAck;
    use crate::infrastructure::database::ConnectionPool;
    use crate::infrastructure::offline::SqliteLocalStore;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct ScriptedRemote {
        responses: Mutex<HashMap<String, VecDeque<Result<RemoteAck, ApiError>>>>,
        pushed: Mutex<Vec<String>>,
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl ScriptedRemote {
        fn respond(&self, entity_id: &str, result: Result<RemoteAck, ApiError>) {
            self.responses
                .lock()
                .unwrap()
                .entry(entity_id.to_string())
                .or_default()
                .push_back(result);
        }

        fn pushed(&self) -> Vec<String> {
            self.pushed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteApi for ScriptedRemote {
        async fn push(&self, item: &SyncQueueItem) -> Result<RemoteAck, ApiError> {
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
            self.pushed.lock().unwrap().push(item.entity_id.clone());
            self.responses
                .lock()
                .unwrap()
                .get_mut(&item.entity_id)
                .and_then(VecDeque::pop_front)
                .unwrap_or(Ok(RemoteAck::default()))
        }
    }

    fn sync_config() -> SyncConfig {
        SyncConfig {
            auto_sync: false,
            sync_interval: 60,
            max_retry: 3,
            batch_size: 50,
            background_sync_tag: "edusync-background-sync".into(),
        }
    }

    async fn setup(
        remote: Arc<ScriptedRemote>,
        online: bool,
    ) -> (Arc<SyncManager>, Arc<SqliteLocalStore>, EventBus) {
        setup_with(remote, online, sync_config()).await
    }

    async fn setup_with(
        remote: Arc<ScriptedRemote>,
        online: bool,
        config: SyncConfig,
    ) -> (Arc<SyncManager>, Arc<SqliteLocalStore>, EventBus) {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store = Arc::new(SqliteLocalStore::new(pool.get_pool().clone()));
        let events = EventBus::default();
        let manager = Arc::new(SyncManager::new(
            store.clone(),
            remote,
            events.clone(),
            config,
            online,
        ));
        (manager, store, events)
    }

    async fn enqueue(manager: &SyncManager, store: &SqliteLocalStore, entity_id: &str) {
        store
            .enqueue(manager.prepare_change(
                SyncOperation::Update,
                SyncEntity::Student,
                entity_id,
                SyncPayload::empty(),
            ))
            .await
            .unwrap();
    }

    fn server_error() -> ApiError {
        ApiError::Server {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[tokio::test]
    async fn offline_changes_replay_when_connectivity_returns() {
        let remote = Arc::new(ScriptedRemote::default());
        let (manager, store, events) = setup(remote.clone(), false).await;
        let mut rx = events.subscribe();

        enqueue(&manager, &store, "s1").await;
        enqueue(&manager, &store, "s2").await;
        let pending = store.pending_items(10).await.unwrap();
        assert!(pending.iter().all(|i| i.state == SyncItemState::Offline));
        assert_eq!(manager.sync_now(SyncTrigger::Manual).await, SyncOutcome::Offline);

        let outcome = manager.set_online(true).await.unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.trigger, SyncTrigger::Online);
        assert_eq!(report.synced, 2);
        assert_eq!(remote.pushed(), vec!["s1", "s2"]);
        assert_eq!(store.queue_count().await.unwrap(), 0);
        assert_eq!(
            rx.recv().await.unwrap(),
            AppEvent::NetworkChanged { online: true }
        );
        assert!(manager.snapshot().await.unwrap().last_sync.is_some());
    }

    #[tokio::test]
    async fn failure_defers_same_record_only() {
        let remote = Arc::new(ScriptedRemote::default());
        remote.respond("s1", Err(server_error()));
        let (manager, store, _) = setup(remote.clone(), true).await;

        enqueue(&manager, &store, "s1").await;
        enqueue(&manager, &store, "s2").await;
        enqueue(&manager, &store, "s1").await;

        let SyncOutcome::Completed(report) = manager.sync_now(SyncTrigger::Manual).await else {
            panic!("expected a completed pass");
        };
        assert_eq!(report.attempted, 2);
        assert_eq!(report.synced, 1);
        assert_eq!(report.retried, 1);
        assert_eq!(report.deferred, 1);
        assert_eq!(remote.pushed(), vec!["s1", "s2"]);

        let pending = store.pending_items(10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].retry_count, 1);
        assert_eq!(pending[0].state, SyncItemState::Queued);

        manager.sync_now(SyncTrigger::Manual).await;
        assert_eq!(remote.pushed(), vec!["s1", "s2", "s1", "s1"]);
        assert_eq!(store.queue_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blocked_record_does_not_fill_the_batch() {
        let remote = Arc::new(ScriptedRemote::default());
        for _ in 0..3 {
            remote.respond("s1", Err(server_error()));
        }
        let (manager, store, _) = setup_with(
            remote.clone(),
            true,
            SyncConfig {
                batch_size: 2,
                max_retry: 10,
                ..sync_config()
            },
        )
        .await;
        enqueue(&manager, &store, "s1").await;
        enqueue(&manager, &store, "s1").await;
        enqueue(&manager, &store, "s1").await;
        enqueue(&manager, &store, "s2").await;

        let SyncOutcome::Completed(report) = manager.sync_now(SyncTrigger::Manual).await else {
            panic!("expected a completed pass");
        };
        assert_eq!(report.attempted, 2);
        assert_eq!(report.retried, 1);
        assert_eq!(report.deferred, 2);
        assert_eq!(report.synced, 1);
        assert_eq!(remote.pushed(), vec!["s1", "s2"]);

        let pending = store.pending_items(10).await.unwrap();
        assert_eq!(pending.len(), 3);
        assert!(pending.iter().all(|i| i.entity_id == "s1"));
    }

    #[tokio::test]
    async fn batch_size_bounds_attempts_per_pass() {
        let remote = Arc::new(ScriptedRemote::default());
        let (manager, store, _) = setup_with(
            remote.clone(),
            true,
            SyncConfig {
                batch_size: 2,
                ..sync_config()
            },
        )
        .await;
        for id in ["s1", "s2", "s3"] {
            enqueue(&manager, &store, id).await;
        }

        let report = manager.sync_now(SyncTrigger::Manual).await;
        assert_eq!(report.report().unwrap().attempted, 2);
        assert_eq!(remote.pushed(), vec!["s1", "s2"]);

        manager.sync_now(SyncTrigger::Manual).await;
        assert_eq!(remote.pushed(), vec!["s1", "s2", "s3"]);
        assert_eq!(store.queue_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn session_expiry_does_not_spend_retries() {
        let remote = Arc::new(ScriptedRemote::default());
        for _ in 0..3 {
            remote.respond("s1", Err(ApiError::Unauthorized));
        }
        remote.respond("s1", Err(server_error()));
        let (manager, store, _) = setup(remote.clone(), true).await;
        enqueue(&manager, &store, "s1").await;

        for _ in 0..3 {
            let outcome = manager.sync_now(SyncTrigger::Manual).await;
            assert!(matches!(outcome, SyncOutcome::Aborted { .. }));
        }
        let pending = store.pending_items(10).await.unwrap();
        assert_eq!(pending[0].retry_count, 0);

        let SyncOutcome::Completed(report) = manager.sync_now(SyncTrigger::Manual).await else {
            panic!("expected a completed pass");
        };
        assert_eq!(report.retried, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(manager.snapshot().await.unwrap().failed_count, 0);
        let pending = store.pending_items(10).await.unwrap();
        assert_eq!(pending[0].retry_count, 1);
        assert_eq!(pending[0].state, SyncItemState::Queued);
    }

    #[tokio::test]
    async fn retries_exhaust_into_failed_and_can_be_requeued() {
        let remote = Arc::new(ScriptedRemote::default());
        for _ in 0..3 {
            remote.respond("s1", Err(server_error()));
        }
        let (manager, store, _) = setup(remote.clone(), true).await;
        enqueue(&manager, &store, "s1").await;

        for _ in 0..3 {
            manager.sync_now(SyncTrigger::Manual).await;
        }
        let failed = manager.failed_items().await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].retry_count, 3);
        assert_eq!(manager.snapshot().await.unwrap().failed_count, 1);

        assert_eq!(manager.retry_failed().await.unwrap(), 1);
        let SyncOutcome::Completed(report) = manager.sync_now(SyncTrigger::Manual).await else {
            panic!("expected a completed pass");
        };
        assert_eq!(report.synced, 1);
        assert_eq!(manager.metrics().total_passes, 4);
        assert_eq!(manager.metrics().consecutive_failures, 0);
    }

    #[tokio::test]
    async fn permanent_rejection_fails_immediately() {
        let remote = Arc::new(ScriptedRemote::default());
        remote.respond(
            "s1",
            Err(ApiError::Client {
                status: 422,
                message: "invalid class".into(),
            }),
        );
        let (manager, store, _) = setup(remote, true).await;
        enqueue(&manager, &store, "s1").await;

        let SyncOutcome::Completed(report) = manager.sync_now(SyncTrigger::Manual).await else {
            panic!("expected a completed pass");
        };
        assert_eq!(report.failed, 1);
        let failed = store.failed_items().await.unwrap();
        assert!(failed[0].last_error.as_deref().unwrap().contains("invalid class"));
    }

    #[tokio::test]
    async fn unauthorized_aborts_the_pass() {
        let remote = Arc::new(ScriptedRemote::default());
        remote.respond("s1", Err(ApiError::Unauthorized));
        let (manager, store, _) = setup(remote.clone(), true).await;
        enqueue(&manager, &store, "s1").await;
        enqueue(&manager, &store, "s2").await;

        let outcome = manager.sync_now(SyncTrigger::Manual).await;
        assert!(matches!(outcome, SyncOutcome::Aborted { .. }));
        assert_eq!(remote.pushed(), vec!["s1"]);
        let pending = store.pending_items(10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|i| i.state == SyncItemState::Queued));
        assert!(manager.snapshot().await.unwrap().last_sync.is_none());
    }

    #[tokio::test]
    async fn only_one_pass_runs_at_a_time() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let remote = Arc::new(ScriptedRemote {
            gate: Some((entered.clone(), release.clone())),
            ..ScriptedRemote::default()
        });
        let (manager, store, _) = setup(remote, true).await;
        enqueue(&manager, &store, "s1").await;

        let running = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.sync_now(SyncTrigger::Manual).await })
        };
        entered.notified().await;

        assert!(manager.is_syncing());
        assert_eq!(
            manager.sync_now(SyncTrigger::Interval).await,
            SyncOutcome::AlreadyRunning
        );

        release.notify_one();
        assert!(matches!(running.await.unwrap(), SyncOutcome::Completed(_)));
        assert!(!manager.is_syncing());
    }

    #[tokio::test]
    async fn auto_sync_stops_on_shutdown() {
        let remote = Arc::new(ScriptedRemote::default());
        let (manager, _, _) = setup(remote, true).await;
        let manager = Arc::new(SyncManager::new(
            manager.store.clone(),
            manager.remote.clone(),
            EventBus::default(),
            SyncConfig {
                auto_sync: true,
                ..sync_config()
            },
            true,
        ));

        let (tx, rx) = watch::channel(false);
        let handle = manager.spawn_auto_sync(rx).unwrap();
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn auto_sync_disabled_spawns_nothing() {
        let (manager, _, _) = setup(Arc::new(ScriptedRemote::default()), true).await;
        let (_tx, rx) = watch::channel(false);
        assert!(manager.spawn_auto_sync(rx).is_none());
    }
}
