use serde::{Deserialize, Serialize};
use std::fmt;

/// Record collections that flow through the sync queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEntity {
    Student,
    Attendance,
}

impl SyncEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncEntity::Student => "student",
            SyncEntity::Attendance => "attendance",
        }
    }

    /// Remote collection path segment.
    pub fn collection(&self) -> &'static str {
        match self {
            SyncEntity::Student => "students",
            SyncEntity::Attendance => "attendance",
        }
    }
}

impl fmt::Display for SyncEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SyncEntity {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "student" => Ok(SyncEntity::Student),
            "attendance" => Ok(SyncEntity::Attendance),
            other => Err(format!("Unknown sync entity: {other}")),
        }
    }
}
