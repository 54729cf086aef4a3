//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request middleware and the todo store produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → tracing.rs (OpenTelemetry spans with attributes, events, status)
//!
//! Consumers:
//!     → stdout (pretty or JSON log lines, opentelemetry-stdout spans)
//!     → GET /metrics (Prometheus scrape, plus process.rs defaults)
//! ```
//!
//! # Design Decisions
//! - Metrics registry and tracer are owned values injected into the app
//!   state; nothing here is a process global except the log subscriber
//! - Span export is synchronous (simple span processor)

pub mod logging;
pub mod metrics;
pub mod process;
pub mod tracing;

pub use self::metrics::{ErrorKind, MetricsRegistry, Operation, Outcome};
pub use self::tracing::{ActiveSpan, Tracer};
