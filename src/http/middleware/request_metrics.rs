//! Request metrics middleware.
//! Records count and duration of every request, fault or not.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::http::response::HandlerFault;
use crate::observability::MetricsRegistry;

/// Route pattern for the request, or the raw URI when nothing matched.
pub fn endpoint_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().to_string())
}

pub async fn track_metrics(
    State(metrics): State<Arc<MetricsRegistry>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = endpoint_label(&request);

    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = match response.extensions().get::<HandlerFault>() {
        Some(fault) => {
            tracing::debug!(
                method = %method,
                endpoint = %endpoint,
                fault = %fault,
                "Request failed"
            );
            fault.status_code()
        }
        None => response.status(),
    };

    metrics.increment_request_counter(&method, &endpoint, status.as_u16());
    metrics.record_request_duration(&method, &endpoint, duration);

    response
}
