pub mod entities;
pub mod student_id;
pub mod value_objects;

pub use entities::{
    AttendanceRecord, AttendanceStatus, Student, StudentDraft, StudentFilter, StudentStatus,
    SyncQueueItem, SyncQueueItemDraft, SyncReport, SyncSnapshot,
};
pub use value_objects::{
    SyncEntity, SyncItemState, SyncOperation, SyncPayload, SyncQueueId, SyncTrigger,
};
