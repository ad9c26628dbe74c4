use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }

    /// Counts towards the attendance rate.
    pub fn is_attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for AttendanceStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            other => Err(format!("Unknown attendance status: {other}")),
        }
    }
}

/// One student's attendance for one day. `(student_id, date)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub synced: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(
        student_id: String,
        date: NaiveDate,
        status: AttendanceStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            student_id,
            date,
            status,
            note,
            synced: false,
            last_sync: None,
            updated_at: now,
        }
    }

    /// Identifier used for the sync queue and the remote collection.
    pub fn entity_id(&self) -> String {
        format!("{}:{}", self.student_id, self.date.format("%Y-%m-%d"))
    }
}

/// Share of attended days, 0-100. `None` when nothing was recorded.
pub fn attendance_rate(records: &[AttendanceRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let attended = records.iter().filter(|r| r.status.is_attended()).count();
    Some(attended as f64 * 100.0 / records.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord::new(
            "s1".into(),
            NaiveDate::from_ymd_opt(2024, 9, day).unwrap(),
            status,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn entity_id_combines_student_and_date() {
        assert_eq!(record(2, AttendanceStatus::Present).entity_id(), "s1:2024-09-02");
    }

    #[test]
    fn rate_counts_late_as_attended() {
        let records = vec![
            record(2, AttendanceStatus::Present),
            record(3, AttendanceStatus::Late),
            record(4, AttendanceStatus::Absent),
            record(5, AttendanceStatus::Present),
        ];
        assert_eq!(attendance_rate(&records), Some(75.0));
        assert_eq!(attendance_rate(&[]), None);
    }
}
