use serde::{Deserialize, Serialize};
use std::fmt;

/// What started a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    Online,
    Manual,
    BackgroundSync,
    Interval,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::Online => "online",
            SyncTrigger::Manual => "manual",
            SyncTrigger::BackgroundSync => "background_sync",
            SyncTrigger::Interval => "interval",
        }
    }
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
