//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber
//! - Pick log verbosity from the environment (development vs production)
//! - Pick output format (pretty for development, JSON for production)
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over the configured defaults
//! - Log level only changes verbosity, never behavior

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Environment, LogFormat, ObservabilityConfig};

/// Default filter directives for `environment`.
pub fn default_directives(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => "todo_app=info,tower_http=info",
        Environment::Development => "todo_app=debug,tower_http=debug",
    }
}

/// Build the filter from `RUST_LOG`, the configured level, or the
/// environment default, in that order.
pub fn build_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = config
            .log_level
            .clone()
            .unwrap_or_else(|| default_directives(config.environment).to_string());
        EnvFilter::new(directives)
    })
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(build_filter(config));

    match config.log_format.resolve(config.environment) {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}
