use crate::domain::value_objects::{
    SyncEntity, SyncItemState, SyncOperation, SyncPayload, SyncQueueId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncQueueItem {
    pub id: SyncQueueId,
    pub operation: SyncOperation,
    pub entity: SyncEntity,
    pub entity_id: String,
    pub payload: SyncPayload,
    pub state: SyncItemState,
    pub retry_count: u32,
    pub max_retries: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SyncQueueItem {
    /// Key used to keep replay ordered per record.
    pub fn entity_key(&self) -> (SyncEntity, String) {
        (self.entity, self.entity_id.clone())
    }

    /// Whether a failure of the attempt in flight uses up the retry budget.
    pub fn last_attempt(&self) -> bool {
        self.retry_count.saturating_add(1) >= self.max_retries
    }
}

/// A mutation waiting to be written to the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncQueueItemDraft {
    pub operation: SyncOperation,
    pub entity: SyncEntity,
    pub entity_id: String,
    pub payload: SyncPayload,
    pub initial_state: SyncItemState,
    pub max_retries: u32,
}

impl SyncQueueItemDraft {
    pub fn new(
        operation: SyncOperation,
        entity: SyncEntity,
        entity_id: impl Into<String>,
        payload: SyncPayload,
    ) -> Self {
        Self {
            operation,
            entity,
            entity_id: entity_id.into(),
            payload,
            initial_state: SyncItemState::Queued,
            max_retries: 3,
        }
    }

    pub fn with_initial_state(mut self, state: SyncItemState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.entity_id.trim().is_empty() {
            return Err("Sync queue item entity id cannot be empty".to_string());
        }
        if !self.initial_state.is_replayable() {
            return Err(format!(
                "Sync queue item cannot start in state {}",
                self.initial_state
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_defaults_to_queued() {
        let draft = SyncQueueItemDraft::new(
            SyncOperation::Create,
            SyncEntity::Student,
            "s1",
            SyncPayload::empty(),
        );
        assert_eq!(draft.initial_state, SyncItemState::Queued);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn last_attempt_follows_retry_budget() {
        let draft = SyncQueueItemDraft::new(
            SyncOperation::Update,
            SyncEntity::Student,
            "s1",
            SyncPayload::empty(),
        );
        let now = Utc::now();
        let mut item = SyncQueueItem {
            id: SyncQueueId::new(1).unwrap(),
            operation: draft.operation,
            entity: draft.entity,
            entity_id: draft.entity_id,
            payload: draft.payload,
            state: SyncItemState::Syncing,
            retry_count: 1,
            max_retries: 3,
            created_at: now,
            updated_at: now,
            synced_at: None,
            last_error: None,
        };
        assert!(!item.last_attempt());
        item.retry_count = 2;
        assert!(item.last_attempt());
        assert_eq!(item.entity_key(), (SyncEntity::Student, "s1".to_string()));
    }

    #[test]
    fn draft_cannot_start_synced() {
        let draft = SyncQueueItemDraft::new(
            SyncOperation::Create,
            SyncEntity::Student,
            "s1",
            SyncPayload::empty(),
        )
        .with_initial_state(SyncItemState::Synced);
        assert!(draft.validate().is_err());
    }
}
