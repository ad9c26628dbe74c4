pub mod local_store;
pub mod remote_api;
pub mod worker_host;

pub use local_store::LocalStore;
pub use remote_api::{ApiError, RemoteAck, RemoteApi};
pub use worker_host::{InstallChoice, InstallPrompt, PlatformError, WorkerHost, WorkerRegistration};
