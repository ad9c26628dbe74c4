pub mod payload;
pub mod sync_entity;
pub mod sync_item_state;
pub mod sync_operation;
pub mod sync_queue_id;
pub mod sync_trigger;

pub use payload::SyncPayload;
pub use sync_entity::SyncEntity;
pub use sync_item_state::SyncItemState;
pub use sync_operation::SyncOperation;
pub use sync_queue_id::SyncQueueId;
pub use sync_trigger::SyncTrigger;
