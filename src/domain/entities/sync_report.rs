use crate::domain::value_objects::SyncTrigger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one replay pass over the queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub trigger: SyncTrigger,
    pub attempted: u32,
    pub synced: u32,
    /// Failed this pass, back in the queue for another attempt.
    pub retried: u32,
    /// Failed for good; kept in the queue in `failed` state.
    pub failed: u32,
    /// Skipped because an earlier item for the same record failed.
    pub deferred: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub fn new(trigger: SyncTrigger, started_at: DateTime<Utc>) -> Self {
        Self {
            trigger,
            attempted: 0,
            synced: 0,
            retried: 0,
            failed: 0,
            deferred: 0,
            started_at,
            finished_at: started_at,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.retried > 0 || self.failed > 0
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}

/// Aggregate sync state shown to the UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub online: bool,
    pub sync_in_progress: bool,
    /// Records (students, attendance) with `synced = false`.
    pub unsynced_count: u64,
    /// Queue items not yet confirmed by the remote service.
    pub queue_count: u64,
    pub failed_count: u64,
    pub last_sync: Option<DateTime<Utc>>,
}
