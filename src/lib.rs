pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::events::{AppEvent, EventBus};
pub use application::services::{
    PwaCapabilities, PwaContext, RecordsService, ServiceWorkerManager, SyncManager, SyncOutcome,
};
pub use domain::student_id::{StudentIdConfig, StudentIdGenerator, generate_migration_plan};
pub use infrastructure::database::ConnectionPool;
pub use infrastructure::offline::SqliteLocalStore;
pub use infrastructure::platform::HeadlessHost;
pub use shared::config::AppConfig;
pub use shared::error::AppError;
pub use state::AppState;

/// Installs the global subscriber; `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edusync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
