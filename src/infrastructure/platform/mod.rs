pub mod headless;

pub use headless::HeadlessHost;
