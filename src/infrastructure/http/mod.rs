pub mod api_client;
pub mod session;

pub use api_client::{ApiResponse, HttpRemoteApi};
pub use session::{Credentials, SessionStore};
