use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentRow {
    pub id: String,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub class_name: Option<String>,
    pub status: String,
    pub attendance_rate: Option<f64>,
    pub average_grade: Option<f64>,
    pub synced: bool,
    pub last_sync: Option<i64>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRow {
    pub student_id: String,
    pub date: String,
    pub status: String,
    pub note: Option<String>,
    pub synced: bool,
    pub last_sync: Option<i64>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncQueueItemRow {
    pub id: i64,
    pub operation: String,
    pub entity: String,
    pub entity_id: String,
    pub payload: String,
    pub state: String,
    pub retry_count: i64,
    pub max_retries: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub synced_at: Option<i64>,
    pub last_error: Option<String>,
}
