#![allow(dead_code)]

use async_trait::async_trait;
use edusync::application::ports::remote_api::{ApiError, RemoteAck, RemoteApi};
use edusync::domain::{StudentDraft, StudentStatus, SyncQueueItem};
use edusync::shared::config::SyncConfig;
use edusync::{
    AppConfig, ConnectionPool, EventBus, RecordsService, SqliteLocalStore, SyncManager,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Remote that rejects pushes for chosen record ids and accepts everything else.
#[derive(Default)]
pub struct SelectiveRemote {
    rejected: Mutex<HashSet<String>>,
    accepted: Mutex<Vec<String>>,
    expired_sessions: Mutex<u32>,
}

impl SelectiveRemote {
    pub fn reject(&self, entity_id: &str) {
        self.rejected.lock().unwrap().insert(entity_id.to_string());
    }

    pub fn accept_all(&self) {
        self.rejected.lock().unwrap().clear();
    }

    /// The next `count` pushes answer 401.
    pub fn expire_sessions(&self, count: u32) {
        *self.expired_sessions.lock().unwrap() = count;
    }

    pub fn accepted(&self) -> Vec<String> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteApi for SelectiveRemote {
    async fn push(&self, item: &SyncQueueItem) -> Result<RemoteAck, ApiError> {
        {
            let mut expired = self.expired_sessions.lock().unwrap();
            if *expired > 0 {
                *expired -= 1;
                return Err(ApiError::Unauthorized);
            }
        }
        if self.rejected.lock().unwrap().contains(&item.entity_id) {
            return Err(ApiError::Server {
                status: 502,
                message: "upstream unavailable".into(),
            });
        }
        self.accepted.lock().unwrap().push(item.entity_id.clone());
        Ok(RemoteAck {
            remote_id: Some(format!("remote-{}", item.id)),
        })
    }
}

pub struct SyncTestContext {
    pub store: Arc<SqliteLocalStore>,
    pub remote: Arc<SelectiveRemote>,
    pub events: EventBus,
    pub sync: Arc<SyncManager>,
    pub records: RecordsService,
}

pub async fn setup_sync_context(online: bool) -> SyncTestContext {
    setup_sync_context_with(online, AppConfig::default().sync).await
}

pub async fn setup_sync_context_with(online: bool, sync_config: SyncConfig) -> SyncTestContext {
    let pool = ConnectionPool::from_memory()
        .await
        .expect("in-memory sqlite");
    pool.migrate().await.expect("migrations");

    let config = AppConfig::default();
    let store = Arc::new(SqliteLocalStore::new(pool.get_pool().clone()));
    let remote = Arc::new(SelectiveRemote::default());
    let events = EventBus::default();
    let sync = Arc::new(SyncManager::new(
        store.clone(),
        remote.clone(),
        events.clone(),
        sync_config,
        online,
    ));
    let records = RecordsService::new(store.clone(), sync.clone(), config.student_id);

    SyncTestContext {
        store,
        remote,
        events,
        sync,
        records,
    }
}

pub fn student_draft(first_name: &str, last_name: &str) -> StudentDraft {
    StudentDraft {
        student_number: None,
        first_name: first_name.into(),
        last_name: last_name.into(),
        class_name: Some("7A".into()),
        status: StudentStatus::Active,
    }
}
