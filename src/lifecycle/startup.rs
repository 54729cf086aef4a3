//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server from a validated configuration
//! - Bind the listener and begin accepting traffic
//! - Hook OS signals up to graceful shutdown
//! - Flush the tracer provider once the server has stopped
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::{ServerError, TodoServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::forward_signals;

/// Run the service until a termination signal arrives.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    tracing::info!(
        bind_address = %config.server.bind_address(),
        environment = config.observability.environment.as_str(),
        span_exporter = ?config.observability.span_exporter,
        "Configuration loaded"
    );

    let server = TodoServer::new(config.clone())?;
    let tracer = server.state().tracer.clone();

    let listener = TcpListener::bind(config.server.bind_address()).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Application is running on: http://{}", local_addr);
    tracing::info!(
        "Metrics available at: http://{}{}",
        local_addr,
        config.observability.metrics_path
    );

    let shutdown = Shutdown::new();
    forward_signals(&shutdown);

    let result = server.run(listener, shutdown.subscribe()).await;
    tracer.shutdown();
    Ok(result?)
}
