use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("Capability not supported: {0}")]
    Unsupported(String),

    #[error("Platform call failed: {0}")]
    Failed(String),
}

impl From<PlatformError> for crate::shared::error::AppError {
    fn from(err: PlatformError) -> Self {
        crate::shared::error::AppError::Platform(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRegistration {
    pub scope: String,
    pub active_version: Option<String>,
}

/// Host environment running the background caching worker.
///
/// Capability checks are synchronous; a host without a capability is a
/// reduced-functionality environment, not an error.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    fn supports_service_worker(&self) -> bool;
    async fn register(
        &self,
        script_url: &str,
        scope: &str,
    ) -> Result<WorkerRegistration, PlatformError>;
    /// Version of a worker that is installed but not yet active.
    async fn waiting_version(
        &self,
        registration: &WorkerRegistration,
    ) -> Result<Option<String>, PlatformError>;
    async fn skip_waiting(&self, registration: &WorkerRegistration) -> Result<(), PlatformError>;
    async fn reload(&self) -> Result<(), PlatformError>;

    fn supports_background_sync(&self) -> bool;
    async fn register_background_sync(&self, tag: &str) -> Result<(), PlatformError>;
    async fn request_persistent_storage(&self) -> Result<bool, PlatformError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallChoice {
    Accepted,
    Dismissed,
}

/// A deferred install prompt captured from the host; usable once.
#[async_trait]
pub trait InstallPrompt: Send + Sync {
    async fn prompt(&self) -> Result<InstallChoice, PlatformError>;
}
