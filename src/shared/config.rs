use crate::domain::student_id::StudentIdConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub service_worker: ServiceWorkerConfig,
    pub student_id: StudentIdConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval: u64,
    pub max_retry: u32,
    pub batch_size: u32,
    pub background_sync_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceWorkerConfig {
    pub script_url: String,
    pub scope: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/edusync.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                timeout_secs: 30,
                access_token: None,
                tenant_id: None,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 300, // 5 minutes
                max_retry: 3,
                batch_size: 100,
                background_sync_tag: "edusync-background-sync".to_string(),
            },
            service_worker: ServiceWorkerConfig {
                script_url: "/sw.js".to_string(),
                scope: "/".to_string(),
            },
            student_id: StudentIdConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("EDUSYNC_DATABASE_URL")
            && !v.trim().is_empty()
        {
            cfg.database.url = v.trim().to_string();
        }

        if let Ok(v) = std::env::var("EDUSYNC_API_BASE_URL")
            && !v.trim().is_empty()
        {
            cfg.api.base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Ok(v) = std::env::var("EDUSYNC_API_TOKEN") {
            cfg.api.access_token = non_empty(&v);
        }
        if let Ok(v) = std::env::var("EDUSYNC_TENANT_ID") {
            cfg.api.tenant_id = non_empty(&v);
        }
        if let Ok(v) = std::env::var("EDUSYNC_API_TIMEOUT_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.api.timeout_secs = value.max(1);
        }

        if let Ok(v) = std::env::var("EDUSYNC_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("EDUSYNC_SYNC_INTERVAL_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.sync.sync_interval = value.max(1);
        }
        if let Ok(v) = std::env::var("EDUSYNC_SYNC_MAX_RETRY")
            && let Some(value) = parse_u32(&v)
        {
            cfg.sync.max_retry = value;
        }
        if let Ok(v) = std::env::var("EDUSYNC_SYNC_BATCH_SIZE")
            && let Some(value) = parse_u32(&v)
        {
            cfg.sync.batch_size = value.max(1);
        }
        if let Ok(v) = std::env::var("EDUSYNC_BACKGROUND_SYNC_TAG")
            && let Some(value) = non_empty(&v)
        {
            cfg.sync.background_sync_tag = value;
        }

        if let Ok(v) = std::env::var("EDUSYNC_SW_SCRIPT_URL")
            && let Some(value) = non_empty(&v)
        {
            cfg.service_worker.script_url = value;
        }
        if let Ok(v) = std::env::var("EDUSYNC_SW_SCOPE")
            && let Some(value) = non_empty(&v)
        {
            cfg.service_worker.scope = value;
        }

        if let Ok(v) = std::env::var("EDUSYNC_STUDENT_ID_PREFIX") {
            cfg.student_id.prefix = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("EDUSYNC_STUDENT_ID_PATTERN")
            && let Some(value) = non_empty(&v)
        {
            cfg.student_id.pattern = value;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(format!(
                "API base_url must be an http(s) url: {}",
                self.api.base_url
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err("API timeout_secs must be greater than 0".to_string());
        }
        if self.sync.auto_sync && self.sync.sync_interval == 0 {
            return Err("Sync sync_interval must be greater than 0".to_string());
        }
        if self.sync.batch_size == 0 {
            return Err("Sync batch_size must be greater than 0".to_string());
        }
        if self.sync.background_sync_tag.trim().is_empty() {
            return Err("Sync background_sync_tag must not be empty".to_string());
        }
        if self.service_worker.script_url.trim().is_empty() {
            return Err("Service worker script_url must not be empty".to_string());
        }
        self.student_id
            .validate()
            .map_err(|err| format!("Student id config: {err}"))?;
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
