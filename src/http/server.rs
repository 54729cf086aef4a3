//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the todo and metrics handlers
//! - Wire up middleware (request ID, access log, tracing, metrics, panics)
//! - Build the shared application state (store, metrics, tracer)
//! - Bind server to listener with graceful shutdown

use axum::{
    extract::{FromRef, Request, State},
    http::header,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::BuildError;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::validation::validate_config;
use crate::config::{AppConfig, ConfigError, SpanExporterKind};
use crate::http::middleware::{trace_requests, track_metrics, RequestTracing};
use crate::http::request::make_request_span;
use crate::http::response::{fault_response, panic_response};
use crate::http::routes::{RouteTable, TODOS_PATH, TODO_PATH};
use crate::observability::{MetricsRegistry, Tracer};
use crate::todos::{handlers, TodoStore};

/// Content type of the Prometheus text exposition.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Error type for building and running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build metrics registry: {0}")]
    Metrics(#[from] BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TodoStore>,
    pub metrics: Arc<MetricsRegistry>,
    pub tracer: Tracer,
}

impl AppState {
    pub fn new(metrics: Arc<MetricsRegistry>, tracer: Tracer) -> Self {
        Self {
            store: Arc::new(TodoStore::new(metrics.clone(), tracer.clone())),
            metrics,
            tracer,
        }
    }
}

impl FromRef<AppState> for Arc<TodoStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<MetricsRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

/// Tracer for the configured span exporter.
pub fn tracer_for(kind: SpanExporterKind) -> Tracer {
    match kind {
        SpanExporterKind::Console => Tracer::with_exporter(opentelemetry_stdout::SpanExporter::default()),
        SpanExporterKind::None => Tracer::new(),
    }
}

/// HTTP server for the todo service.
pub struct TodoServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl TodoServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        let metrics = Arc::new(MetricsRegistry::new()?);
        let tracer = tracer_for(config.observability.span_exporter);
        Self::with_components(config, metrics, tracer)
    }

    /// Create a server around an existing registry and tracer.
    ///
    /// The configuration is validated first: axum panics on route paths it
    /// cannot parse, so a bad `metrics_path` must never reach the router.
    pub fn with_components(
        config: AppConfig,
        metrics: Arc<MetricsRegistry>,
        tracer: Tracer,
    ) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let state = AppState::new(metrics, tracer);
        let routes = Self::routes(&config.observability.metrics_path);
        let router = Self::layered(routes, &config, state.clone());
        Ok(Self { router, config, state })
    }

    fn routes(metrics_path: &str) -> Router<AppState> {
        Router::new()
            .route(TODOS_PATH, get(handlers::find_all).post(handlers::create))
            .route(
                TODO_PATH,
                get(handlers::find_one).put(handlers::update).delete(handlers::delete),
            )
            .route(metrics_path, get(render_metrics))
    }

    /// Wrap `routes` in the full middleware stack.
    fn layered(routes: Router<AppState>, config: &AppConfig, state: AppState) -> Router {
        let request_tracing = RequestTracing {
            tracer: state.tracer.clone(),
            routes: Arc::new(RouteTable::standard(&config.observability.metrics_path)),
        };

        routes
            .fallback(no_route)
            .with_state(state.clone())
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn_with_state(state.metrics.clone(), track_metrics))
            .layer(middleware::from_fn_with_state(request_tracing, trace_requests))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            metrics_path = %self.config.observability.metrics_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

async fn render_metrics(State(metrics): State<Arc<MetricsRegistry>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], metrics.render())
}

async fn no_route(request: Request) -> Response {
    let message = format!("Cannot {} {}", request.method(), request.uri());
    tracing::debug!(message = %message, "No route matched");
    fault_response(axum::http::StatusCode::NOT_FOUND, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::{REQUEST_DURATION_SECONDS, REQUESTS_TOTAL};
    use crate::observability::tracing::{attribute, has_event};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, StatusCode};
    use opentelemetry::trace::Status;
    use opentelemetry::Value;
    use opentelemetry_sdk::export::trace::SpanData;
    use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
    use tower::ServiceExt;

    fn server() -> (TodoServer, InMemorySpanExporter) {
        let spans = InMemorySpanExporter::default();
        let server = TodoServer::with_components(
            AppConfig::default(),
            Arc::new(MetricsRegistry::new().unwrap()),
            Tracer::with_exporter(spans.clone()),
        )
        .unwrap();
        (server, spans)
    }

    fn spans_named(exporter: &InMemorySpanExporter, name: &str) -> Vec<SpanData> {
        exporter
            .get_finished_spans()
            .unwrap()
            .into_iter()
            .filter(|s| s.name == name)
            .collect()
    }

    fn request(method: Method, uri: &str, body: Option<&str>) -> Request {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn explode() -> StatusCode {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let (server, _) = server();

        let response = server
            .router()
            .oneshot(request(Method::POST, "/todos", Some(r#"{"title":"Buy milk"}"#)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().contains_key("x-request-id"));
        let created = json(response).await;
        assert_eq!(created["completed"], false);

        let id = created["id"].as_str().unwrap();
        let response = server
            .router()
            .oneshot(request(Method::GET, &format!("/todos/{}", id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await, created);
    }

    #[tokio::test]
    async fn test_not_found_body_and_metrics() {
        let (server, spans) = server();

        let response = server
            .router()
            .oneshot(request(Method::GET, "/todos/missing", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json(response).await;
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["message"], "Todo with ID missing not found");

        let metrics = &server.state().metrics;
        assert_eq!(
            metrics.sample(
                REQUESTS_TOTAL,
                &[("method", "GET"), ("endpoint", "/todos/{id}"), ("status", "404")]
            ),
            Some(1.0)
        );

        let request_spans = spans_named(&spans, "GET /todos/missing");
        let request_span = &request_spans[0];
        assert!(matches!(request_span.status, Status::Error { .. }));
        assert!(has_event(request_span, "exception"));
        assert_eq!(attribute(request_span, "handler"), Some(&Value::from("find_one")));
        assert_eq!(attribute(request_span, "http.status_code"), Some(&Value::I64(404)));
    }

    #[tokio::test]
    async fn test_panicking_handler_counts_as_500() {
        let spans = InMemorySpanExporter::default();
        let tracer = Tracer::with_exporter(spans.clone());
        let config = AppConfig::default();
        let state = AppState::new(Arc::new(MetricsRegistry::new().unwrap()), tracer.clone());
        let routes = TodoServer::routes(&config.observability.metrics_path).route("/explode", get(explode));
        let router = TodoServer::layered(routes, &config, state.clone());

        let response = router.oneshot(request(Method::GET, "/explode", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            state.metrics.sample(
                REQUESTS_TOTAL,
                &[("method", "GET"), ("endpoint", "/explode"), ("status", "500")]
            ),
            Some(1.0)
        );
        let count = format!("{}_count", REQUEST_DURATION_SECONDS);
        assert_eq!(
            state.metrics.sample(&count, &[("method", "GET"), ("endpoint", "/explode")]),
            Some(1.0)
        );

        let request_spans = spans_named(&spans, "GET /explode");
        assert_eq!(request_spans.len(), 1);
        assert_eq!(request_spans[0].status, Status::error("kaboom"));
        assert!(has_event(&request_spans[0], "exception"));
        assert_eq!(attribute(&request_spans[0], "error"), Some(&Value::Bool(true)));
        assert_eq!(tracer.open_spans(), 0);
    }

    #[tokio::test]
    async fn test_unmatched_route_uses_raw_url() {
        let (server, _) = server();

        let response = server
            .router()
            .oneshot(request(Method::GET, "/nope?x=1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert_eq!(
            server
                .state()
                .metrics
                .sample(REQUESTS_TOTAL, &[("endpoint", "/nope?x=1"), ("status", "404")]),
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn test_metrics_route_serves_exposition() {
        let (server, _) = server();

        let response = server
            .router()
            .oneshot(request(Method::GET, "/metrics", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], METRICS_CONTENT_TYPE);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("todo_count"));
    }

    #[test]
    fn test_unroutable_metrics_path_is_rejected() {
        for path in ["/:metrics", "/stats/{", "/a//b"] {
            let mut config = AppConfig::default();
            config.observability.metrics_path = path.to_string();

            let result = TodoServer::with_components(
                config,
                Arc::new(MetricsRegistry::new().unwrap()),
                Tracer::new(),
            );
            assert!(
                matches!(result, Err(ServerError::Config(ConfigError::Validation(_)))),
                "{} should be rejected",
                path
            );
        }
    }
}
