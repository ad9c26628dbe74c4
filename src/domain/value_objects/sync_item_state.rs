use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a sync queue item.
///
/// ```text
/// offline -> queued -> syncing -> synced
///                ^         |
///                +---------+ (retryable failure)
///   syncing -> failed -> queued (explicit retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncItemState {
    Offline,
    Queued,
    Syncing,
    Synced,
    Failed,
}

impl SyncItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncItemState::Offline => "offline",
            SyncItemState::Queued => "queued",
            SyncItemState::Syncing => "syncing",
            SyncItemState::Synced => "synced",
            SyncItemState::Failed => "failed",
        }
    }

    /// Still owed to the remote service.
    pub fn is_pending(&self) -> bool {
        !matches!(self, SyncItemState::Synced)
    }

    /// Eligible for the next replay pass.
    pub fn is_replayable(&self) -> bool {
        matches!(self, SyncItemState::Offline | SyncItemState::Queued)
    }

    pub fn can_transition_to(&self, next: SyncItemState) -> bool {
        use SyncItemState::*;
        matches!(
            (self, next),
            (Offline, Queued)
                | (Queued, Syncing)
                | (Offline, Syncing)
                | (Syncing, Synced)
                | (Syncing, Queued)
                | (Syncing, Failed)
                | (Failed, Queued)
        )
    }

    pub fn transition(self, next: SyncItemState) -> Result<SyncItemState, String> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(format!(
                "Invalid sync state transition: {} -> {}",
                self.as_str(),
                next.as_str()
            ))
        }
    }
}

impl fmt::Display for SyncItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SyncItemState {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "offline" => Ok(SyncItemState::Offline),
            "queued" => Ok(SyncItemState::Queued),
            "syncing" => Ok(SyncItemState::Syncing),
            "synced" => Ok(SyncItemState::Synced),
            "failed" => Ok(SyncItemState::Failed),
            other => Err(format!("Unknown sync state: {other}")),
        }
    }
}
