pub mod pwa;
pub mod records_service;
pub mod service_worker;
mod sync_metrics;
pub mod sync_manager;

pub use pwa::{PwaCapabilities, PwaContext};
pub use records_service::RecordsService;
pub use service_worker::{ServiceWorkerManager, WorkerStatus};
pub use sync_manager::{SyncManager, SyncOutcome};
pub use sync_metrics::{PassOutcome, SyncMetricsSnapshot};
