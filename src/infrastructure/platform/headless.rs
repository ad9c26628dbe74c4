use crate::application::ports::worker_host::{PlatformError, WorkerHost, WorkerRegistration};
use async_trait::async_trait;

/// Host without a browser runtime (CLI, tests, server-side rendering).
///
/// Every capability check reports `false`, so callers take their degraded path.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessHost;

fn unsupported(capability: &str) -> PlatformError {
    PlatformError::Unsupported(format!("{capability} is not available in a headless host"))
}

#[async_trait]
impl WorkerHost for HeadlessHost {
    fn supports_service_worker(&self) -> bool {
        false
    }

    async fn register(
        &self,
        _script_url: &str,
        _scope: &str,
    ) -> Result<WorkerRegistration, PlatformError> {
        Err(unsupported("service worker"))
    }

    async fn waiting_version(
        &self,
        _registration: &WorkerRegistration,
    ) -> Result<Option<String>, PlatformError> {
        Ok(None)
    }

    async fn skip_waiting(&self, _registration: &WorkerRegistration) -> Result<(), PlatformError> {
        Err(unsupported("service worker"))
    }

    async fn reload(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn supports_background_sync(&self) -> bool {
        false
    }

    async fn register_background_sync(&self, _tag: &str) -> Result<(), PlatformError> {
        Err(unsupported("background sync"))
    }

    async fn request_persistent_storage(&self) -> Result<bool, PlatformError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn headless_host_reports_no_capabilities() {
        let host = HeadlessHost;
        assert!(!host.supports_service_worker());
        assert!(!host.supports_background_sync());
        assert!(matches!(
            host.register("/sw.js", "/").await,
            Err(PlatformError::Unsupported(_))
        ));
        assert!(!host.request_persistent_storage().await.unwrap());
    }
}
