use super::mappers::{
    date_to_string, map_attendance_row, map_student_row, map_sync_queue_item_row,
    map_sync_queue_rows,
};
use super::rows::{AttendanceRow, StudentRow, SyncQueueItemRow};
use crate::application::ports::local_store::LocalStore;
use crate::domain::entities::{
    AttendanceRecord, Student, StudentFilter, SyncQueueItem, SyncQueueItemDraft,
};
use crate::domain::value_objects::{SyncEntity, SyncItemState, SyncQueueId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

pub struct SqliteLocalStore {
    pool: SqlitePool,
}

impl SqliteLocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn map_student_write_error(err: sqlx::Error, student_number: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        return AppError::ValidationError(format!(
            "Student number {student_number} already exists"
        ));
    }
    err.into()
}

async fn fetch_item(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<SyncQueueItem>, AppError> {
    sqlx::query_as::<_, SyncQueueItemRow>("SELECT * FROM sync_queue WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(map_sync_queue_item_row)
        .transpose()
}

async fn insert_item(
    conn: &mut SqliteConnection,
    draft: &SyncQueueItemDraft,
    now: i64,
) -> Result<SyncQueueItem, AppError> {
    draft.validate().map_err(AppError::ValidationError)?;

    let result = sqlx::query(
        r#"
        INSERT INTO sync_queue (
            operation, entity, entity_id, payload, state,
            retry_count, max_retries, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?7)
        "#,
    )
    .bind(draft.operation.as_str())
    .bind(draft.entity.as_str())
    .bind(&draft.entity_id)
    .bind(draft.payload.to_json_string())
    .bind(draft.initial_state.as_str())
    .bind(i64::from(draft.max_retries))
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let id = result.last_insert_rowid();
    debug!(
        item_id = id,
        entity = draft.entity.as_str(),
        entity_id = %draft.entity_id,
        operation = draft.operation.as_str(),
        "sync item enqueued"
    );

    fetch_item(conn, id)
        .await?
        .ok_or_else(|| AppError::Database(format!("Sync queue item {id} vanished after insert")))
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn upsert_student(
        &self,
        student: &Student,
        change: SyncQueueItemDraft,
    ) -> Result<SyncQueueItem, AppError> {
        student.validate().map_err(AppError::ValidationError)?;
        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO students (
                id, student_number, first_name, last_name, class_name, status,
                attendance_rate, average_grade, synced, last_sync, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                student_number = excluded.student_number,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                class_name = excluded.class_name,
                status = excluded.status,
                attendance_rate = excluded.attendance_rate,
                average_grade = excluded.average_grade,
                synced = 0,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&student.id)
        .bind(&student.student_number)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.class_name)
        .bind(student.status.as_str())
        .bind(student.attendance_rate)
        .bind(student.average_grade)
        .bind(student.last_sync.map(|at| at.timestamp_millis()))
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|err| map_student_write_error(err, &student.student_number))?;

        let item = insert_item(&mut tx, &change, now).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn delete_student(
        &self,
        id: &str,
        change: SyncQueueItemDraft,
    ) -> Result<SyncQueueItem, AppError> {
        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM students WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(AppError::not_found(format!("Student {id}")));
        }

        let item = insert_item(&mut tx, &change, now).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn get_student(&self, id: &str) -> Result<Option<Student>, AppError> {
        sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(map_student_row)
            .transpose()
    }

    async fn list_students(&self, filter: StudentFilter) -> Result<Vec<Student>, AppError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM students WHERE 1 = 1");
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(class_name) = filter.class_name {
            builder.push(" AND class_name = ").push_bind(class_name);
        }
        builder.push(" ORDER BY last_name ASC, first_name ASC");

        let rows = builder
            .build_query_as::<StudentRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(map_student_row).collect()
    }

    async fn student_numbers(&self) -> Result<Vec<String>, AppError> {
        let numbers = sqlx::query_scalar::<_, String>("SELECT student_number FROM students")
            .fetch_all(&self.pool)
            .await?;
        Ok(numbers)
    }

    async fn upsert_attendance(
        &self,
        record: &AttendanceRecord,
        change: SyncQueueItemDraft,
    ) -> Result<SyncQueueItem, AppError> {
        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        let student_exists = sqlx::query("SELECT 1 FROM students WHERE id = ?1")
            .bind(&record.student_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !student_exists {
            return Err(AppError::not_found(format!(
                "Student {}",
                record.student_id
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO attendance (
                student_id, date, status, note, synced, last_sync, updated_at
            ) VALUES (?1, ?2, ?3, ?4, 0, NULL, ?5)
            ON CONFLICT(student_id, date) DO UPDATE SET
                status = excluded.status,
                note = excluded.note,
                synced = 0,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.student_id)
        .bind(date_to_string(record.date))
        .bind(record.status.as_str())
        .bind(&record.note)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let item = insert_item(&mut tx, &change, now).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn attendance_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            "SELECT * FROM attendance WHERE date = ?1 ORDER BY student_id ASC",
        )
        .bind(date_to_string(date))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_attendance_row).collect()
    }

    async fn attendance_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            "SELECT * FROM attendance WHERE student_id = ?1 ORDER BY date ASC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_attendance_row).collect()
    }

    async fn enqueue(&self, draft: SyncQueueItemDraft) -> Result<SyncQueueItem, AppError> {
        let mut conn = self.pool.acquire().await?;
        insert_item(&mut conn, &draft, now_millis()).await
    }

    async fn get_item(&self, id: SyncQueueId) -> Result<Option<SyncQueueItem>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_item(&mut conn, id.value()).await
    }

    async fn pending_items(&self, limit: u32) -> Result<Vec<SyncQueueItem>, AppError> {
        self.pending_items_after(None, limit).await
    }

    async fn pending_items_after(
        &self,
        after: Option<SyncQueueId>,
        limit: u32,
    ) -> Result<Vec<SyncQueueItem>, AppError> {
        let rows = sqlx::query_as::<_, SyncQueueItemRow>(
            r#"
            SELECT * FROM sync_queue
            WHERE state IN ('offline', 'queued') AND id > ?1
            ORDER BY id ASC
            LIMIT ?2
            "#,
        )
        .bind(after.map_or(0, |id| id.value()))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        map_sync_queue_rows(rows)
    }

    async fn failed_items(&self) -> Result<Vec<SyncQueueItem>, AppError> {
        let rows = sqlx::query_as::<_, SyncQueueItemRow>(
            "SELECT * FROM sync_queue WHERE state = 'failed' ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        map_sync_queue_rows(rows)
    }

    async fn transition_item(
        &self,
        id: SyncQueueId,
        to: SyncItemState,
        error: Option<String>,
    ) -> Result<SyncQueueItem, AppError> {
        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        let current = fetch_item(&mut tx, id.value())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Sync queue item {id}")))?;
        current
            .state
            .transition(to)
            .map_err(AppError::ValidationError)?;

        let (retry_count, last_error, synced_at) = match (current.state, to) {
            (SyncItemState::Syncing, SyncItemState::Queued | SyncItemState::Failed) => (
                current.retry_count.saturating_add(1),
                error.or(current.last_error),
                None,
            ),
            (SyncItemState::Failed, SyncItemState::Queued) => (0, current.last_error, None),
            (_, SyncItemState::Synced) => (current.retry_count, None, Some(now)),
            _ => (current.retry_count, current.last_error, None),
        };

        let updated = sqlx::query(
            r#"
            UPDATE sync_queue
            SET state = ?1, retry_count = ?2, last_error = ?3, synced_at = ?4, updated_at = ?5
            WHERE id = ?6 AND state = ?7
            "#,
        )
        .bind(to.as_str())
        .bind(i64::from(retry_count))
        .bind(&last_error)
        .bind(synced_at)
        .bind(now)
        .bind(id.value())
        .bind(current.state.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated != 1 {
            return Err(AppError::Database(format!(
                "Sync queue item {id} changed while transitioning to {to}"
            )));
        }

        let item = fetch_item(&mut tx, id.value())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Sync queue item {id}")))?;
        tx.commit().await?;
        Ok(item)
    }

    async fn release_item(
        &self,
        id: SyncQueueId,
        error: Option<String>,
    ) -> Result<SyncQueueItem, AppError> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            r#"
            UPDATE sync_queue
            SET state = 'queued', last_error = COALESCE(?1, last_error), updated_at = ?2
            WHERE id = ?3 AND state = 'syncing'
            "#,
        )
        .bind(&error)
        .bind(now_millis())
        .bind(id.value())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated != 1 {
            return Err(AppError::ValidationError(format!(
                "Sync queue item {id} is not syncing"
            )));
        }

        let item = fetch_item(&mut tx, id.value())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Sync queue item {id}")))?;
        tx.commit().await?;
        debug!(item_id = %id, "sync item released without spending a retry");
        Ok(item)
    }

    async fn promote_offline_items(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE sync_queue SET state = 'queued', updated_at = ?1 WHERE state = 'offline'",
        )
        .bind(now_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn recover_interrupted(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE sync_queue SET state = 'queued', updated_at = ?1 WHERE state = 'syncing'",
        )
        .bind(now_millis())
        .execute(&self.pool)
        .await?;
        let recovered = result.rows_affected();
        if recovered > 0 {
            info!(recovered, "requeued sync items left over from an interrupted pass");
        }
        Ok(recovered)
    }

    async fn retry_failed(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sync_queue
            SET state = 'queued', retry_count = 0, updated_at = ?1
            WHERE state = 'failed'
            "#,
        )
        .bind(now_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn purge_synced(&self, before: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM sync_queue WHERE state = 'synced' AND synced_at < ?1",
        )
        .bind(before.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn mark_entity_synced(
        &self,
        entity: SyncEntity,
        entity_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let sql = match entity {
            SyncEntity::Student => {
                r#"
                UPDATE students SET synced = 1, last_sync = ?1
                WHERE id = ?2
                  AND NOT EXISTS (
                    SELECT 1 FROM sync_queue
                    WHERE entity = ?3 AND entity_id = ?2 AND state != 'synced'
                  )
                "#
            }
            SyncEntity::Attendance => {
                r#"
                UPDATE attendance SET synced = 1, last_sync = ?1
                WHERE (student_id || ':' || date) = ?2
                  AND NOT EXISTS (
                    SELECT 1 FROM sync_queue
                    WHERE entity = ?3 AND entity_id = ?2 AND state != 'synced'
                  )
                "#
            }
        };

        let result = sqlx::query(sql)
            .bind(at.timestamp_millis())
            .bind(entity_id)
            .bind(entity.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unsynced_count(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students WHERE synced = 0)
              + (SELECT COUNT(*) FROM attendance WHERE synced = 0)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn queue_count(&self) -> Result<u64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sync_queue WHERE state != 'synced'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u64)
    }

    async fn failed_count(&self) -> Result<u64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sync_queue WHERE state = 'failed'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u64)
    }
}
