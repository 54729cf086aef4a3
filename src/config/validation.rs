//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and path shapes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::new("server.host", "must not be empty"));
    }

    if config.server.port == 0 {
        errors.push(ValidationError::new("server.port", "must not be 0"));
    }

    let path = &config.observability.metrics_path;
    if !path.starts_with('/') {
        errors.push(ValidationError::new(
            "observability.metrics_path",
            format!("'{}' must start with '/'", path),
        ));
    } else if path == "/" || path == "/todos" || path.starts_with("/todos/") {
        errors.push(ValidationError::new(
            "observability.metrics_path",
            format!("'{}' collides with the todo routes", path),
        ));
    } else if let Some(problem) = static_route_problem(path) {
        errors.push(ValidationError::new(
            "observability.metrics_path",
            format!("'{}' {}", path, problem),
        ));
    }

    if let Some(level) = &config.observability.log_level {
        if level.trim().is_empty() {
            errors.push(ValidationError::new("observability.log_level", "must not be empty when set"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Why `path` is not a plain static route, if it isn't. The router panics
/// on `:`/`*` segments and unbalanced braces, and treats `{..}` as captures.
fn static_route_problem(path: &str) -> Option<&'static str> {
    if path.contains(['{', '}']) {
        return Some("must not contain '{' or '}'");
    }

    let segments: Vec<&str> = path[1..].split('/').collect();
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() && i != last {
            return Some("must not contain empty segments");
        }
        if segment.starts_with(':') || segment.starts_with('*') {
            return Some("segments must not start with ':' or '*'");
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.server.host = " ".to_string();
        config.observability.metrics_path = "metrics".to_string();
        config.observability.log_level = Some(String::new());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "server.host");
    }

    #[test]
    fn test_metrics_path_cannot_shadow_todos() {
        let mut config = AppConfig::default();
        config.observability.metrics_path = "/todos".to_string();
        assert!(validate_config(&config).is_err());

        config.observability.metrics_path = "/internal/metrics".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_path_must_be_a_static_route() {
        let mut config = AppConfig::default();
        for path in ["/:metrics", "/*rest", "/stats/{id}", "/stats/{", "/a//b"] {
            config.observability.metrics_path = path.to_string();
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors.len(), 1, "{}", path);
            assert_eq!(errors[0].field, "observability.metrics_path");
        }

        config.observability.metrics_path = "/internal/metrics/".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
