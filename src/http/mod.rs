//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, access log span)
//!     → middleware/request_tracing.rs (request span)
//!     → middleware/request_metrics.rs (request counter + duration)
//!     → todos::handlers (store operation)
//!     → response.rs (fault body + marker, panic conversion)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod routes;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::HandlerFault;
pub use server::{AppState, ServerError, TodoServer};
