//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Root configuration for the todo service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration.
    pub server: ServerConfig,

    /// Logging, metrics and span export settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Listen port. Overridden by `PORT`.
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Deployment environment. Only affects log verbosity and format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    /// Anything other than `production` is treated as development.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("production") {
            Ok(Environment::Production)
        } else {
            Ok(Environment::Development)
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty in development, JSON in production.
    #[default]
    Auto,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn resolve(self, environment: Environment) -> LogFormat {
        match (self, environment) {
            (LogFormat::Auto, Environment::Production) => LogFormat::Json,
            (LogFormat::Auto, Environment::Development) => LogFormat::Pretty,
            (format, _) => format,
        }
    }
}

/// Where finished spans go.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpanExporterKind {
    /// One structured log event per span.
    #[default]
    Console,
    /// Spans are recorded but discarded.
    None,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Deployment environment. Overridden by `APP_ENV` / `NODE_ENV`.
    pub environment: Environment,

    /// Explicit filter directives (e.g. "todo_app=trace"). Defaults depend
    /// on `environment`; `RUST_LOG` overrides both.
    pub log_level: Option<String>,

    /// Log output format.
    pub log_format: LogFormat,

    /// Span exporter.
    pub span_exporter: SpanExporterKind,

    /// Path the metrics exposition is served on.
    pub metrics_path: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            log_level: None,
            log_format: LogFormat::Auto,
            span_exporter: SpanExporterKind::Console,
            metrics_path: "/metrics".to_string(),
        }
    }
}
