//! Request tracing middleware.
//! Wraps every request in a `"<METHOD> <URL>"` span.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::Status;
use std::sync::Arc;
use tracing::Instrument;

use crate::http::response::HandlerFault;
use crate::http::routes::RouteTable;
use crate::observability::Tracer;

/// State for [`trace_requests`].
#[derive(Clone)]
pub struct RequestTracing {
    pub tracer: Tracer,
    pub routes: Arc<RouteTable>,
}

pub async fn trace_requests(
    State(state): State<RequestTracing>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let url = request.uri().to_string();

    let mut span = state.tracer.start_span(format!("{} {}", method, url));
    span.set_attribute("http.method", method.to_string());
    span.set_attribute("http.url", url);

    if let Some(route) = request.extensions().get::<MatchedPath>() {
        span.set_attribute("http.route", route.as_str().to_owned());
        if let Some(info) = state.routes.resolve(&method, route.as_str()) {
            span.set_attribute("controller", info.controller);
            span.set_attribute("handler", info.handler);
        }
    }

    let log_span = span.log_span().clone();
    let response = next.run(request).instrument(log_span).await;

    span.set_attribute("http.status_code", i64::from(response.status().as_u16()));
    if let Some(fault) = response.extensions().get::<HandlerFault>() {
        span.set_status(Status::error(fault.message.clone()));
        span.record_error(fault);
        span.set_attribute("error", true);
    }
    span.end();

    response
}
