//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use tokio::net::TcpListener;

use todo_app::config::AppConfig;
use todo_app::http::TodoServer;
use todo_app::lifecycle::Shutdown;
use todo_app::observability::{MetricsRegistry, Tracer};

/// A running service bound to an ephemeral local port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub metrics: Arc<MetricsRegistry>,
    pub tracer: Tracer,
    pub spans: InMemorySpanExporter,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn metrics_text(&self) -> String {
        self.client
            .get(self.url("/metrics"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    /// Finished spans with the given name, in end order.
    pub fn spans_named(&self, name: &str) -> Vec<SpanData> {
        self.spans
            .get_finished_spans()
            .unwrap()
            .into_iter()
            .filter(|s| s.name == name)
            .collect()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the service with an in-memory span exporter.
pub async fn spawn_app() -> TestApp {
    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    let spans = InMemorySpanExporter::default();
    let tracer = Tracer::with_exporter(spans.clone());
    let server = TodoServer::with_components(AppConfig::default(), metrics.clone(), tracer.clone()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        metrics,
        tracer,
        spans,
        shutdown,
    }
}
