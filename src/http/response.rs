//! Fault responses.
//!
//! # Responsibilities
//! - Define the JSON error body shared by every failing route
//! - Mark fault responses with a `HandlerFault` extension so the request
//!   middleware can tell a fault from a normal response
//! - Turn handler panics into 500 fault responses
//!
//! # Design Decisions
//! - The fault travels on the response, never replacing or rewriting it
//! - A fault without a status means "unclassified"; observers treat it as 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use std::fmt;

/// JSON error body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    pub error: &'static str,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            error: status.canonical_reason().unwrap_or("Error"),
        }
    }
}

/// Response extension describing the fault that produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFault {
    pub status: Option<StatusCode>,
    pub message: String,
}

impl HandlerFault {
    pub fn new(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The fault's status, 500 when it carries none.
    pub fn status_code(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for HandlerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerFault {}

/// Build a fault response: JSON body plus `HandlerFault` extension.
pub fn fault_response(status: StatusCode, message: impl Into<String>) -> Response {
    let message = message.into();
    let mut response = (status, Json(ErrorBody::new(status, message.clone()))).into_response();
    response
        .extensions_mut()
        .insert(HandlerFault::new(Some(status), message));
    response
}

/// Panic handler for `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let mut response = (status, Json(ErrorBody::new(status, "Internal server error"))).into_response();
    response.extensions_mut().insert(HandlerFault::new(None, detail));
    response
}
