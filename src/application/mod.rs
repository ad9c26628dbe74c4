pub mod events;
pub mod ports;
pub mod services;

pub use events::{AppEvent, EventBus};
