use crate::application::events::{AppEvent, EventBus};
use crate::shared::config::ApiConfig;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub tenant_id: Option<String>,
}

/// Credentials attached to every remote call.
pub struct SessionStore {
    credentials: RwLock<Option<Credentials>>,
    events: EventBus,
}

impl SessionStore {
    pub fn new(events: EventBus) -> Self {
        Self {
            credentials: RwLock::new(None),
            events,
        }
    }

    pub fn from_config(config: &ApiConfig, events: EventBus) -> Self {
        let credentials = config
            .access_token
            .as_ref()
            .filter(|token| !token.trim().is_empty())
            .map(|token| Credentials {
                access_token: token.clone(),
                tenant_id: config.tenant_id.clone(),
            });
        Self {
            credentials: RwLock::new(credentials),
            events,
        }
    }

    pub async fn sign_in(&self, credentials: Credentials) {
        info!(tenant = ?credentials.tenant_id, "session established");
        *self.credentials.write().await = Some(credentials);
    }

    pub async fn credentials(&self) -> Option<Credentials> {
        self.credentials.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Clears credentials after the remote service rejected them. Returns
    /// `false` when there was no session left to clear.
    pub async fn teardown(&self) -> bool {
        let previous = self.credentials.write().await.take();
        if previous.is_none() {
            return false;
        }
        warn!("session rejected by remote service; credentials cleared");
        self.events.publish(AppEvent::SessionExpired);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::AppConfig;

    fn api_config(token: Option<&str>) -> ApiConfig {
        ApiConfig {
            access_token: token.map(str::to_string),
            tenant_id: Some("north-campus".into()),
            ..AppConfig::default().api
        }
    }

    #[tokio::test]
    async fn blank_token_is_not_a_session() {
        let store = SessionStore::from_config(&api_config(Some("  ")), EventBus::default());
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn teardown_clears_once_and_notifies() {
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let store = SessionStore::from_config(&api_config(Some("token-1")), events);

        assert_eq!(
            store.credentials().await.unwrap().tenant_id.as_deref(),
            Some("north-campus")
        );
        assert!(store.teardown().await);
        assert!(!store.teardown().await);
        assert!(!store.is_authenticated().await);
        assert_eq!(rx.recv().await.unwrap(), AppEvent::SessionExpired);
        assert!(rx.try_recv().is_err());
    }
}
