use super::rows::{AttendanceRow, StudentRow, SyncQueueItemRow};
use crate::domain::entities::{
    AttendanceRecord, AttendanceStatus, Student, StudentStatus, SyncQueueItem,
};
use crate::domain::value_objects::{
    SyncEntity, SyncItemState, SyncOperation, SyncPayload, SyncQueueId,
};
use crate::shared::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn millis_to_datetime(value: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        AppError::DeserializationError(format!("Invalid timestamp: {value}"))
    })
}

fn optional_millis(value: Option<i64>) -> Result<Option<DateTime<Utc>>, AppError> {
    value.map(millis_to_datetime).transpose()
}

pub fn date_to_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|err| AppError::DeserializationError(format!("Invalid date {value}: {err}")))
}

fn to_u32(value: i64, field: &str) -> Result<u32, AppError> {
    u32::try_from(value)
        .map_err(|_| AppError::DeserializationError(format!("Invalid {field}: {value}")))
}

pub fn map_student_row(row: StudentRow) -> Result<Student, AppError> {
    let status = StudentStatus::try_from(row.status.as_str())
        .map_err(AppError::DeserializationError)?;

    Ok(Student {
        id: row.id,
        student_number: row.student_number,
        first_name: row.first_name,
        last_name: row.last_name,
        class_name: row.class_name,
        status,
        attendance_rate: row.attendance_rate,
        average_grade: row.average_grade,
        synced: row.synced,
        last_sync: optional_millis(row.last_sync)?,
        updated_at: millis_to_datetime(row.updated_at)?,
    })
}

pub fn map_attendance_row(row: AttendanceRow) -> Result<AttendanceRecord, AppError> {
    let status = AttendanceStatus::try_from(row.status.as_str())
        .map_err(AppError::DeserializationError)?;

    Ok(AttendanceRecord {
        student_id: row.student_id,
        date: parse_date(&row.date)?,
        status,
        note: row.note,
        synced: row.synced,
        last_sync: optional_millis(row.last_sync)?,
        updated_at: millis_to_datetime(row.updated_at)?,
    })
}

pub fn map_sync_queue_item_row(row: SyncQueueItemRow) -> Result<SyncQueueItem, AppError> {
    let id = SyncQueueId::new(row.id).map_err(AppError::DeserializationError)?;
    let operation =
        SyncOperation::try_from(row.operation.as_str()).map_err(AppError::DeserializationError)?;
    let entity =
        SyncEntity::try_from(row.entity.as_str()).map_err(AppError::DeserializationError)?;
    let state =
        SyncItemState::try_from(row.state.as_str()).map_err(AppError::DeserializationError)?;
    let payload =
        SyncPayload::from_json_str(&row.payload).map_err(AppError::DeserializationError)?;

    Ok(SyncQueueItem {
        id,
        operation,
        entity,
        entity_id: row.entity_id,
        payload,
        state,
        retry_count: to_u32(row.retry_count, "retry_count")?,
        max_retries: to_u32(row.max_retries, "max_retries")?,
        created_at: millis_to_datetime(row.created_at)?,
        updated_at: millis_to_datetime(row.updated_at)?,
        synced_at: optional_millis(row.synced_at)?,
        last_error: row.last_error,
    })
}

pub fn map_sync_queue_rows(rows: Vec<SyncQueueItemRow>) -> Result<Vec<SyncQueueItem>, AppError> {
    rows.into_iter().map(map_sync_queue_item_row).collect()
}
