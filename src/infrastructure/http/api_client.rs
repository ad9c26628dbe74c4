use super::session::SessionStore;
use crate::application::ports::remote_api::{ApiError, RemoteAck, RemoteApi};
use crate::domain::entities::SyncQueueItem;
use crate::domain::value_objects::SyncOperation;
use crate::shared::config::ApiConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

const TENANT_HEADER: &str = "X-Tenant-ID";
const MAX_MESSAGE_LEN: usize = 200;

/// Envelope returned by the records service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApiResponse {
    #[serde(rename = "ok")]
    Success {
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(rename = "error")]
    Failure { message: String },
}

impl ApiResponse {
    fn parse(body: &str) -> Result<Self, ApiError> {
        let response: ApiResponse =
            serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        if let ApiResponse::Success { id: Some(id) } = &response
            && id.trim().is_empty()
        {
            return Err(ApiError::Decode("empty remote id".to_string()));
        }
        Ok(response)
    }
}

pub struct HttpRemoteApi {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpRemoteApi {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn request_target(&self, item: &SyncQueueItem) -> (Method, String) {
        let collection = item.entity.collection();
        match item.operation {
            SyncOperation::Create => (Method::POST, format!("{}/{collection}", self.base_url)),
            SyncOperation::Update => (
                Method::PUT,
                format!("{}/{collection}/{}", self.base_url, item.entity_id),
            ),
            SyncOperation::Delete => (
                Method::DELETE,
                format!("{}/{collection}/{}", self.base_url, item.entity_id),
            ),
        }
    }
}

fn failure_message(body: &str) -> String {
    if let Ok(ApiResponse::Failure { message }) = serde_json::from_str::<ApiResponse>(body) {
        return message;
    }
    body.chars().take(MAX_MESSAGE_LEN).collect()
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn push(&self, item: &SyncQueueItem) -> Result<RemoteAck, ApiError> {
        let Some(credentials) = self.session.credentials().await else {
            warn!(item_id = %item.id, "no session available for sync request");
            return Err(ApiError::Unauthorized);
        };

        let (method, url) = self.request_target(item);
        debug!(item_id = %item.id, %method, %url, "pushing sync item");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&credentials.access_token);
        if let Some(tenant_id) = &credentials.tenant_id {
            request = request.header(TENANT_HEADER, tenant_id);
        }
        if method != Method::DELETE {
            request = request.json(item.payload.as_json());
        }

        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.session.teardown().await;
            return Err(ApiError::Unauthorized);
        }

        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        if status.is_server_error() {
            let message = failure_message(&body);
            error!(status = status.as_u16(), %url, %message, "records service error");
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(ApiError::Client {
                status: status.as_u16(),
                message: failure_message(&body),
            });
        }

        if body.trim().is_empty() {
            return Ok(RemoteAck::default());
        }
        match ApiResponse::parse(&body)? {
            ApiResponse::Success { id } => Ok(RemoteAck { remote_id: id }),
            // 2xx carrying an error envelope is a rejection of the payload.
            ApiResponse::Failure { message } => Err(ApiError::Client {
                status: status.as_u16(),
                message,
            }),
        }
    }
}
