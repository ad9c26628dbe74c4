use crate::domain::entities::{
    AttendanceRecord, Student, StudentFilter, SyncQueueItem, SyncQueueItemDraft,
};
use crate::domain::value_objects::{SyncEntity, SyncItemState, SyncQueueId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Durable local record store and sync queue.
///
/// Record writes and the matching queue entry are committed together, so a
/// mutated record never exists without a pending item that will carry it.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn upsert_student(
        &self,
        student: &Student,
        change: SyncQueueItemDraft,
    ) -> Result<SyncQueueItem, AppError>;
    async fn delete_student(
        &self,
        id: &str,
        change: SyncQueueItemDraft,
    ) -> Result<SyncQueueItem, AppError>;
    async fn get_student(&self, id: &str) -> Result<Option<Student>, AppError>;
    async fn list_students(&self, filter: StudentFilter) -> Result<Vec<Student>, AppError>;
    async fn student_numbers(&self) -> Result<Vec<String>, AppError>;

    async fn upsert_attendance(
        &self,
        record: &AttendanceRecord,
        change: SyncQueueItemDraft,
    ) -> Result<SyncQueueItem, AppError>;
    async fn attendance_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, AppError>;
    async fn attendance_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AppError>;

    async fn enqueue(&self, draft: SyncQueueItemDraft) -> Result<SyncQueueItem, AppError>;
    async fn get_item(&self, id: SyncQueueId) -> Result<Option<SyncQueueItem>, AppError>;
    /// Offline and queued items in enqueue order.
    async fn pending_items(&self, limit: u32) -> Result<Vec<SyncQueueItem>, AppError>;
    /// Pending items with an id above `after`, in enqueue order.
    async fn pending_items_after(
        &self,
        after: Option<SyncQueueId>,
        limit: u32,
    ) -> Result<Vec<SyncQueueItem>, AppError>;
    async fn failed_items(&self) -> Result<Vec<SyncQueueItem>, AppError>;
    /// Applies a validated state change; retry bookkeeping follows the edge taken.
    async fn transition_item(
        &self,
        id: SyncQueueId,
        to: SyncItemState,
        error: Option<String>,
    ) -> Result<SyncQueueItem, AppError>;
    /// Puts a `syncing` item back to `queued` leaving `retry_count` untouched.
    async fn release_item(
        &self,
        id: SyncQueueId,
        error: Option<String>,
    ) -> Result<SyncQueueItem, AppError>;
    async fn promote_offline_items(&self) -> Result<u64, AppError>;
    /// Items left in `syncing` by an interrupted pass go back to `queued`.
    async fn recover_interrupted(&self) -> Result<u64, AppError>;
    async fn retry_failed(&self) -> Result<u64, AppError>;
    async fn purge_synced(&self, before: DateTime<Utc>) -> Result<u64, AppError>;
    /// Flags the record synced when no unconfirmed item for it remains.
    async fn mark_entity_synced(
        &self,
        entity: SyncEntity,
        entity_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    async fn unsynced_count(&self) -> Result<u64, AppError>;
    async fn queue_count(&self) -> Result<u64, AppError>;
    async fn failed_count(&self) -> Result<u64, AppError>;
}
