//! Instrumented in-memory todo service library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod todos;

pub use config::AppConfig;
pub use http::TodoServer;
pub use lifecycle::Shutdown;
