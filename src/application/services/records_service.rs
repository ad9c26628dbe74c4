use super::sync_manager::SyncManager;
use crate::application::ports::local_store::LocalStore;
use crate::domain::entities::attendance::attendance_rate;
use crate::domain::entities::{
    AttendanceRecord, AttendanceStatus, Student, StudentDraft, StudentFilter, StudentStatus,
};
use crate::domain::student_id::{StudentIdConfig, StudentIdGenerator};
use crate::domain::value_objects::{SyncEntity, SyncOperation, SyncPayload};
use crate::shared::error::AppError;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

fn payload_of<T: Serialize>(value: &T) -> Result<SyncPayload, AppError> {
    SyncPayload::from_serializable(value).map_err(AppError::SerializationError)
}

/// Local mutations of school records. Every write lands in the store together
/// with its sync item, then the sync manager is told about it.
pub struct RecordsService {
    store: Arc<dyn LocalStore>,
    sync: Arc<SyncManager>,
    id_config: StudentIdConfig,
    // Serialises number allocation between local callers.
    allocation: Mutex<()>,
}

impl RecordsService {
    pub fn new(
        store: Arc<dyn LocalStore>,
        sync: Arc<SyncManager>,
        id_config: StudentIdConfig,
    ) -> Self {
        Self {
            store,
            sync,
            id_config,
            allocation: Mutex::new(()),
        }
    }

    pub async fn id_generator(&self) -> Result<StudentIdGenerator, AppError> {
        let existing = self.store.student_numbers().await?;
        Ok(StudentIdGenerator::for_current_year(
            self.id_config.clone(),
            existing,
        )?)
    }

    pub async fn create_student(&self, draft: StudentDraft) -> Result<Student, AppError> {
        let _allocation = self.allocation.lock().await;

        let student_number = match draft
            .student_number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
        {
            Some(number) => number.to_string(),
            None => self.id_generator().await?.generate_id(None)?.id,
        };

        let student = Student::from_draft(draft, student_number, Utc::now());
        let change = self.sync.prepare_change(
            SyncOperation::Create,
            SyncEntity::Student,
            &student.id,
            payload_of(&student)?,
        );
        let item = self.store.upsert_student(&student, change).await?;
        info!(
            student_id = %student.id,
            student_number = %student.student_number,
            "student created"
        );
        self.sync.notify_enqueued(&item).await;
        Ok(student)
    }

    pub async fn update_student(&self, mut student: Student) -> Result<Student, AppError> {
        let current = self
            .store
            .get_student(&student.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student {}", student.id)))?;

        student.synced = false;
        student.last_sync = current.last_sync;
        student.updated_at = Utc::now();

        let change = self.sync.prepare_change(
            SyncOperation::Update,
            SyncEntity::Student,
            &student.id,
            payload_of(&student)?,
        );
        let item = self.store.upsert_student(&student, change).await?;
        self.sync.notify_enqueued(&item).await;
        Ok(student)
    }

    pub async fn set_student_status(
        &self,
        id: &str,
        status: StudentStatus,
    ) -> Result<Student, AppError> {
        let mut student = self
            .store
            .get_student(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student {id}")))?;
        student.status = status;
        self.update_student(student).await
    }

    pub async fn delete_student(&self, id: &str) -> Result<(), AppError> {
        let change = self.sync.prepare_change(
            SyncOperation::Delete,
            SyncEntity::Student,
            id,
            payload_of(&json!({ "id": id }))?,
        );
        let item = self.store.delete_student(id, change).await?;
        info!(student_id = %id, "student deleted");
        self.sync.notify_enqueued(&item).await;
        Ok(())
    }

    pub async fn record_attendance(
        &self,
        student_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
        note: Option<String>,
    ) -> Result<AttendanceRecord, AppError> {
        let already_recorded = self
            .store
            .attendance_for_student(student_id)
            .await?
            .iter()
            .any(|record| record.date == date);
        let operation = if already_recorded {
            SyncOperation::Update
        } else {
            SyncOperation::Create
        };

        let record = AttendanceRecord::new(student_id.to_string(), date, status, note, Utc::now());
        let change = self.sync.prepare_change(
            operation,
            SyncEntity::Attendance,
            record.entity_id(),
            payload_of(&record)?,
        );
        let item = self.store.upsert_attendance(&record, change).await?;
        self.sync.notify_enqueued(&item).await;
        Ok(record)
    }

    pub async fn active_students(&self) -> Result<Vec<Student>, AppError> {
        self.store.list_students(StudentFilter::active()).await
    }

    pub async fn students(&self, filter: StudentFilter) -> Result<Vec<Student>, AppError> {
        self.store.list_students(filter).await
    }

    pub async fn attendance_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, AppError> {
        self.store.attendance_on(date).await
    }

    /// Attended share of recorded days, from local data.
    pub async fn attendance_rate_for(&self, student_id: &str) -> Result<Option<f64>, AppError> {
        let records = self.store.attendance_for_student(student_id).await?;
        Ok(attendance_rate(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::EventBus;
    use crate::application::ports::remote_api::{ApiError, RemoteAck, RemoteApi};
    use crate::domain::entities::SyncQueueItem;
    use crate::domain::value_objects::SyncItemState;
    use crate::infrastructure::database::ConnectionPool;
    use crate::infrastructure::offline::SqliteLocalStore;
    use crate::shared::config::AppConfig;
    use async_trait::async_trait;
    use chrono::Datelike;

    struct AcceptAll;

    #[async_trait]
    impl RemoteApi for AcceptAll {
        async fn push(&self, _item: &SyncQueueItem) -> Result<RemoteAck, ApiError> {
            Ok(RemoteAck::default())
        }
    }

    async fn setup(online: bool) -> (RecordsService, Arc<SqliteLocalStore>, Arc<SyncManager>) {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store = Arc::new(SqliteLocalStore::new(pool.get_pool().clone()));
        let config = AppConfig::default();
        let sync = Arc::new(SyncManager::new(
            store.clone(),
            Arc::new(AcceptAll),
            EventBus::default(),
            config.sync.clone(),
            online,
        ));
        let service = RecordsService::new(store.clone(), sync.clone(), config.student_id);
        (service, store, sync)
    }

    fn draft(first_name: &str) -> StudentDraft {
        StudentDraft {
            student_number: None,
            first_name: first_name.into(),
            last_name: "Hopper".into(),
            class_name: Some("6C".into()),
            status: StudentStatus::Active,
        }
    }

    #[tokio::test]
    async fn allocates_sequential_student_numbers() {
        let (service, _, _) = setup(true).await;
        let year = Utc::now().year();

        let first = service.create_student(draft("Grace")).await.unwrap();
        let second = service.create_student(draft("Alan")).await.unwrap();

        assert_eq!(first.student_number, format!("STU{year}001"));
        assert_eq!(second.student_number, format!("STU{year}002"));
        assert!(!first.synced);
    }

    #[tokio::test]
    async fn keeps_supplied_student_number() {
        let (service, _, _) = setup(true).await;
        let mut supplied = draft("Grace");
        supplied.student_number = Some(" LEGACY-17 ".into());

        let student = service.create_student(supplied).await.unwrap();
        assert_eq!(student.student_number, "LEGACY-17");
    }

    #[tokio::test]
    async fn offline_mutations_queue_as_offline_and_sync_later() {
        let (service, store, sync) = setup(false).await;

        let student = service.create_student(draft("Grace")).await.unwrap();
        service
            .set_student_status(&student.id, StudentStatus::Transferred)
            .await
            .unwrap();

        let pending = store.pending_items(10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|i| i.state == SyncItemState::Offline));
        assert_eq!(pending[1].operation, SyncOperation::Update);
        assert!(service.active_students().await.unwrap().is_empty());

        sync.set_online(true).await.unwrap();
        let reloaded = store.get_student(&student.id).await.unwrap().unwrap();
        assert!(reloaded.synced);
        assert!(reloaded.last_sync.is_some());
        assert_eq!(sync.snapshot().await.unwrap().unsynced_count, 0);
    }

    #[tokio::test]
    async fn attendance_upserts_per_day() {
        let (service, store, _) = setup(true).await;
        let student = service.create_student(draft("Grace")).await.unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();

        service
            .record_attendance(&student.id, monday, AttendanceStatus::Absent, None)
            .await
            .unwrap();
        service
            .record_attendance(
                &student.id,
                monday,
                AttendanceStatus::Late,
                Some("bus delay".into()),
            )
            .await
            .unwrap();
        service
            .record_attendance(&student.id, tuesday, AttendanceStatus::Present, None)
            .await
            .unwrap();

        let on_monday = service.attendance_on(monday).await.unwrap();
        assert_eq!(on_monday.len(), 1);
        assert_eq!(on_monday[0].note.as_deref(), Some("bus delay"));
        assert_eq!(
            service.attendance_rate_for(&student.id).await.unwrap(),
            Some(100.0)
        );

        let operations: Vec<_> = store
            .pending_items(10)
            .await
            .unwrap()
            .into_iter()
            .filter(|i| i.entity == SyncEntity::Attendance)
            .map(|i| i.operation)
            .collect();
        assert_eq!(
            operations,
            vec![
                SyncOperation::Create,
                SyncOperation::Update,
                SyncOperation::Create
            ]
        );
    }

    #[tokio::test]
    async fn deleting_missing_student_is_not_found() {
        let (service, store, _) = setup(true).await;
        let err = service.delete_student("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.queue_count().await.unwrap(), 0);
    }
}
