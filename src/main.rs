//! Todo service (v1)
//!
//! An in-memory CRUD service for todo items built with Tokio and Axum,
//! instrumented with structured logs, Prometheus metrics and spans.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ access log ─▶ tracing ─▶ metrics ─▶ handler
//!                                                   │          │          │
//!                                                   ▼          ▼          ▼
//!                                                 spans    counters   todo store
//!                                                                   (span + metrics
//!                                                                    per operation)
//!     Client Response
//!     ◀────────────── (faults observed on the way out, never rewritten)
//!
//!     GET /metrics ─▶ Prometheus text exposition (todo_* + todo_app_process_*)
//! ```

use clap::Parser;
use std::path::PathBuf;

use todo_app::config;
use todo_app::lifecycle::startup;
use todo_app::observability::logging;

#[derive(Parser)]
#[command(name = "todo-app")]
#[command(about = "In-memory todo service with metrics and tracing", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port (overrides the file and PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = config::load(args.config.as_deref(), args.port)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(
        environment = config.observability.environment.as_str(),
        "todo-app v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
