//! Span recording for traced operations.
//!
//! # Responsibilities
//! - Create OpenTelemetry spans for store operations and inbound requests
//! - Record attributes, events, status and errors on open spans
//! - Guarantee every span is ended exactly once
//! - Correlate log lines with the span they were emitted in
//!
//! # Design Decisions
//! - Each `Tracer` owns its own `TracerProvider`; nothing is installed as
//!   the global provider
//! - `ActiveSpan` is an RAII guard around the SDK span: `end()` finishes it
//!   explicitly, `Drop` finishes it on every other exit path including
//!   unwinding
//! - Export goes through a simple (synchronous) span processor
//! - A counting `SpanProcessor` tracks started/ended spans

use opentelemetry::trace::{Span as _, Status, TraceResult, Tracer as _, TracerProvider as _};
use opentelemetry::{Context, KeyValue, Value};
use opentelemetry_sdk::export::trace::{SpanData, SpanExporter};
use opentelemetry_sdk::trace::{self as sdktrace, SpanProcessor, TracerProvider};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Instrumentation scope name for every span this service creates.
pub const INSTRUMENTATION_SCOPE: &str = "todo-app";

#[derive(Debug, Default)]
struct SpanCounts {
    started: AtomicU64,
    ended: AtomicU64,
}

/// Span processor that only counts starts and ends.
#[derive(Debug, Clone, Default)]
pub struct SpanCounter {
    counts: Arc<SpanCounts>,
}

impl SpanCounter {
    pub fn started(&self) -> u64 {
        self.counts.started.load(Ordering::Relaxed)
    }

    pub fn ended(&self) -> u64 {
        self.counts.ended.load(Ordering::Relaxed)
    }
}

impl SpanProcessor for SpanCounter {
    fn on_start(&self, _span: &mut sdktrace::Span, _cx: &Context) {
        self.counts.started.fetch_add(1, Ordering::Relaxed);
    }

    fn on_end(&self, _span: SpanData) {
        self.counts.ended.fetch_add(1, Ordering::Relaxed);
    }

    fn force_flush(&self) -> TraceResult<()> {
        Ok(())
    }

    fn shutdown(&self) -> TraceResult<()> {
        Ok(())
    }
}

/// Creates spans through a service-local tracer provider.
#[derive(Clone)]
pub struct Tracer {
    provider: TracerProvider,
    tracer: sdktrace::Tracer,
    counter: SpanCounter,
}

impl Tracer {
    /// A tracer that records and counts spans without exporting them.
    pub fn new() -> Self {
        Self::build(TracerProvider::builder())
    }

    /// A tracer that hands every finished span to `exporter` as it ends.
    pub fn with_exporter<E>(exporter: E) -> Self
    where
        E: SpanExporter + 'static,
    {
        Self::build(TracerProvider::builder().with_simple_exporter(exporter))
    }

    fn build(builder: sdktrace::Builder) -> Self {
        let counter = SpanCounter::default();
        let provider = builder.with_span_processor(counter.clone()).build();
        let tracer = provider.tracer(INSTRUMENTATION_SCOPE);
        Self {
            provider,
            tracer,
            counter,
        }
    }

    /// Open a span. It ends when `end()` is called or when it is dropped.
    pub fn start_span(&self, name: impl Into<Cow<'static, str>>) -> ActiveSpan {
        let name = name.into();
        let span = self.tracer.start(name.clone());
        let context = span.span_context();
        let log_span = tracing::info_span!(
            "span",
            otel.name = %name,
            trace_id = %context.trace_id(),
            span_id = %context.span_id(),
        );

        ActiveSpan { span, log_span }
    }

    /// Run `work` inside a span named `name`.
    ///
    /// `Ok` marks the span Ok. `Err` marks it Error with the error's message
    /// and records the error on the span; the error is returned unchanged.
    /// The span is ended exactly once on every path, including a panic in
    /// `work`.
    pub fn in_span<T, E, F>(&self, name: impl Into<Cow<'static, str>>, work: F) -> Result<T, E>
    where
        E: Error,
        F: FnOnce(&mut ActiveSpan) -> Result<T, E>,
    {
        let mut span = self.start_span(name);
        let result = {
            let _entered = span.log_span.clone().entered();
            work(&mut span)
        };

        match &result {
            Ok(_) => span.set_status(Status::Ok),
            Err(e) => {
                span.set_status(Status::error(e.to_string()));
                span.record_error(e);
            }
        }
        span.end();
        result
    }

    pub fn started_spans(&self) -> u64 {
        self.counter.started()
    }

    pub fn ended_spans(&self) -> u64 {
        self.counter.ended()
    }

    /// Spans started but not yet ended.
    pub fn open_spans(&self) -> u64 {
        self.started_spans().saturating_sub(self.ended_spans())
    }

    /// Flush and stop the provider. Spans started afterwards are dropped.
    pub fn shutdown(&self) {
        if let Err(e) = self.provider.shutdown() {
            tracing::warn!(error = %e, "Tracer provider shutdown failed");
        }
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("started", &self.started_spans())
            .field("ended", &self.ended_spans())
            .finish()
    }
}

/// Handle to an open span.
pub struct ActiveSpan {
    span: sdktrace::Span,
    log_span: tracing::Span,
}

impl ActiveSpan {
    pub fn set_attribute(&mut self, key: &'static str, value: impl Into<Value>) {
        self.span.set_attribute(KeyValue::new(key, value));
    }

    pub fn add_event(&mut self, name: &'static str) {
        self.span.add_event(name, Vec::new());
    }

    pub fn set_status(&mut self, status: Status) {
        self.span.set_status(status);
    }

    /// Record an `exception` event describing `error`.
    pub fn record_error(&mut self, error: &dyn Error) {
        self.span.record_error(error);
    }

    /// The `tracing` span log lines inside this scope are attached to.
    pub fn log_span(&self) -> &tracing::Span {
        &self.log_span
    }

    pub fn end(mut self) {
        self.span.end();
    }
}

impl Drop for ActiveSpan {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.span.set_status(Status::error("panicked"));
        }
        // No-op when `end()` already ran.
        self.span.end();
    }
}

/// Set an attribute on `span` if there is one.
pub fn set_attribute(span: Option<&mut ActiveSpan>, key: &'static str, value: impl Into<Value>) {
    if let Some(span) = span {
        span.set_attribute(key, value);
    }
}

/// Add an event to `span` if there is one.
pub fn add_event(span: Option<&mut ActiveSpan>, name: &'static str) {
    if let Some(span) = span {
        span.add_event(name);
    }
}

/// Value of the attribute `key` on a finished span.
pub fn attribute<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    span.attributes
        .iter()
        .rev()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

pub fn has_event(span: &SpanData, name: &str) -> bool {
    span.events.iter().any(|e| e.name == name)
}
