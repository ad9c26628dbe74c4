use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Graduated,
    Transferred,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
            StudentStatus::Graduated => "graduated",
            StudentStatus::Transferred => "transferred",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for StudentStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "active" => Ok(StudentStatus::Active),
            "inactive" => Ok(StudentStatus::Inactive),
            "graduated" => Ok(StudentStatus::Graduated),
            "transferred" => Ok(StudentStatus::Transferred),
            other => Err(format!("Unknown student status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub class_name: Option<String>,
    pub status: StudentStatus,
    pub attendance_rate: Option<f64>,
    pub average_grade: Option<f64>,
    pub synced: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn from_draft(draft: StudentDraft, student_number: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            student_number,
            first_name: draft.first_name,
            last_name: draft.last_name,
            class_name: draft.class_name,
            status: draft.status,
            attendance_rate: None,
            average_grade: None,
            synced: false,
            last_sync: None,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("Student first and last name are required".to_string());
        }
        if self.student_number.trim().is_empty() {
            return Err("Student number is required".to_string());
        }
        if let Some(rate) = self.attendance_rate
            && !(0.0..=100.0).contains(&rate)
        {
            return Err(format!("Attendance rate must be within 0-100: {rate}"));
        }
        Ok(())
    }
}

/// Input for a new student; `student_number` is allocated when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub student_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub class_name: Option<String>,
    #[serde(default)]
    pub status: StudentStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub status: Option<StudentStatus>,
    pub class_name: Option<String>,
}

impl StudentFilter {
    pub fn active() -> Self {
        Self {
            status: Some(StudentStatus::Active),
            class_name: None,
        }
    }
}
