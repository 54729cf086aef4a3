//! Request identification.
//!
//! # Responsibilities
//! - Name the request id header set/propagated by tower-http
//! - Build the per-request access log span
//!
//! # Design Decisions
//! - Request ID added as early as possible (outermost layer) for tracing
//! - Incoming `x-request-id` values are kept, missing ones are generated

use axum::{body::Body, http::Request};

pub const X_REQUEST_ID: &str = "x-request-id";

/// The request id header value, or `"unknown"` if absent/unreadable.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Access log span for `TraceLayer`.
pub fn make_request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "http_request",
        request_id = %request_id(request),
        method = %request.method(),
        uri = %request.uri(),
        context = "HTTP",
    )
}
