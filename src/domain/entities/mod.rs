pub mod attendance;
pub mod student;
pub mod sync_queue_item;
pub mod sync_report;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use student::{Student, StudentDraft, StudentFilter, StudentStatus};
pub use sync_queue_item::{SyncQueueItem, SyncQueueItemDraft};
pub use sync_report::{SyncReport, SyncSnapshot};
