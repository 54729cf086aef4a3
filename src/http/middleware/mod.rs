//! Request middleware ("interceptors").
//!
//! Applied around every route in a fixed order, outermost first:
//! tracing, then metrics, then the panic catcher. Each one only observes
//! the response; none of them rewrites or absorbs a fault.

pub mod request_metrics;
pub mod request_tracing;

pub use request_metrics::track_metrics;
pub use request_tracing::{trace_requests, RequestTracing};
