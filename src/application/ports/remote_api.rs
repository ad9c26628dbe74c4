use crate::domain::entities::SyncQueueItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remote acceptance of one queued mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteAck {
    pub remote_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Session is no longer authorized")]
    Unauthorized,

    #[error("Request rejected with status {status}: {message}")]
    Client { status: u16, message: String },

    #[error("Server failed with status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Worth another attempt later; everything else is a final answer.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Server { .. } | ApiError::Network(_) | ApiError::Decode(_) => true,
            ApiError::Client { status, .. } => matches!(status, 408 | 429),
            ApiError::Unauthorized => false,
        }
    }
}

#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn push(&self, item: &SyncQueueItem) -> Result<RemoteAck, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(ApiError::Network("reset".into()).is_retryable());
        assert!(
            ApiError::Server {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            ApiError::Client {
                status: 429,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            !ApiError::Client {
                status: 422,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(!ApiError::Unauthorized.is_retryable());
    }
}
