//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define request-level and domain-level todo metrics
//! - Render the Prometheus text exposition served on `/metrics`
//! - Publish default process metrics alongside the todo metrics
//!
//! # Metrics
//! - `todo_requests_total` (counter): requests by method, endpoint, status
//! - `todo_request_duration_seconds` (histogram): latency distribution
//! - `todo_operations_total` (counter): store operations by outcome
//! - `todo_count` (gauge): current todos split into completed/pending
//! - `todo_errors_total` (counter): store faults by classification
//!
//! # Design Decisions
//! - The Prometheus recorder is owned by the registry and never installed
//!   globally; every emission runs under `metrics::with_local_recorder`
//! - Updates are fire-and-forget and cannot fail
//! - Histogram buckets are fixed at construction

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::fmt;

use crate::observability::process::ProcessCollector;

pub const REQUESTS_TOTAL: &str = "todo_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "todo_request_duration_seconds";
pub const OPERATIONS_TOTAL: &str = "todo_operations_total";
pub const TODO_COUNT: &str = "todo_count";
pub const ERRORS_TOTAL: &str = "todo_errors_total";

/// Prefix applied to the default process metrics.
pub const DEFAULT_METRICS_PREFIX: &str = "todo_app_";

/// Bucket boundaries (seconds) for `todo_request_duration_seconds`.
pub const REQUEST_DURATION_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0];

/// Logical store operation, used as the `operation` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FindAll,
    FindOne,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FindAll => "findAll",
            Operation::FindOne => "findOne",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Error classification, used as the `error_type` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Unknown => "Unknown",
        }
    }
}

/// Process-wide registry of todo metrics.
///
/// Shared via `Arc` between the request middleware, the store, and the
/// `/metrics` handler.
pub struct MetricsRegistry {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    process: ProcessCollector,
}

impl MetricsRegistry {
    /// Build the registry and register every todo metric.
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
                REQUEST_DURATION_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        let registry = Self {
            recorder,
            handle,
            process: ProcessCollector::new(DEFAULT_METRICS_PREFIX),
        };
        registry.describe();
        registry.set_todo_count(0, 0);
        Ok(registry)
    }

    fn describe(&self) {
        self.scoped(|| {
            describe_counter!(REQUESTS_TOTAL, "Total number of TODO requests");
            describe_histogram!(REQUEST_DURATION_SECONDS, "Duration of TODO requests in seconds");
            describe_counter!(OPERATIONS_TOTAL, "Total number of TODO operations");
            describe_gauge!(TODO_COUNT, "Current number of TODOs");
            describe_counter!(ERRORS_TOTAL, "Total number of TODO errors");
        });
        self.process.describe(&self.recorder);
    }

    /// Run `f` with this registry's recorder as the active one.
    fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        metrics::with_local_recorder(&self.recorder, f)
    }

    pub fn increment_request_counter(&self, method: &str, endpoint: &str, status_code: u16) {
        self.scoped(|| {
            counter!(
                REQUESTS_TOTAL,
                "method" => method.to_owned(),
                "endpoint" => endpoint.to_owned(),
                "status" => status_code.to_string()
            )
            .increment(1);
        });
    }

    pub fn record_request_duration(&self, method: &str, endpoint: &str, duration_secs: f64) {
        self.scoped(|| {
            histogram!(
                REQUEST_DURATION_SECONDS,
                "method" => method.to_owned(),
                "endpoint" => endpoint.to_owned()
            )
            .record(duration_secs);
        });
    }

    pub fn increment_operation_counter(&self, operation: Operation, outcome: Outcome) {
        self.scoped(|| {
            counter!(
                OPERATIONS_TOTAL,
                "operation" => operation.as_str(),
                "status" => outcome.as_str()
            )
            .increment(1);
        });
    }

    /// Publish the completed/pending split. Callers pass counts recomputed
    /// from a full scan of the list.
    pub fn set_todo_count(&self, completed: usize, pending: usize) {
        self.scoped(|| {
            gauge!(TODO_COUNT, "status" => "completed").set(completed as f64);
            gauge!(TODO_COUNT, "status" => "pending").set(pending as f64);
        });
    }

    pub fn increment_error_counter(&self, operation: Operation, kind: ErrorKind) {
        self.scoped(|| {
            counter!(
                ERRORS_TOTAL,
                "operation" => operation.as_str(),
                "error_type" => kind.as_str()
            )
            .increment(1);
        });
    }

    /// Render the text exposition, refreshing process metrics first.
    pub fn render(&self) -> String {
        self.process.collect(&self.recorder);
        self.handle.render()
    }

    /// Read one sample back out of the current exposition.
    pub fn sample(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        parse_sample(&self.handle.render(), name, labels)
    }
}

/// Find the value of the series `name` whose labels include every pair in
/// `labels`. Extra labels on the series are ignored.
pub fn parse_sample(exposition: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .filter_map(parse_line)
        .find(|(series, series_labels, _)| {
            series == name
                && labels
                    .iter()
                    .all(|(k, v)| series_labels.iter().any(|(sk, sv)| sk == k && sv == v))
        })
        .map(|(_, _, value)| value)
}

type Sample = (String, Vec<(String, String)>, f64);

fn parse_line(line: &str) -> Option<Sample> {
    let (series, value) = line.trim().rsplit_once(' ')?;
    let value = match value {
        "+Inf" => f64::INFINITY,
        "-Inf" => f64::NEG_INFINITY,
        v => v.parse().ok()?,
    };

    match series.split_once('{') {
        None => Some((series.to_string(), Vec::new(), value)),
        Some((name, rest)) => {
            let body = rest.strip_suffix('}')?;
            Some((name.to_string(), parse_labels(body)?, value))
        }
    }
}

fn parse_labels(body: &str) -> Option<Vec<(String, String)>> {
    let mut labels = Vec::new();
    let mut chars = body.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(',') | Some(' ')) {
            chars.next();
        }
        if chars.peek().is_none() {
            return Some(labels);
        }

        let key: String = chars.by_ref().take_while(|c| *c != '=').collect();
        if chars.next() != Some('"') {
            return None;
        }

        let mut value = String::new();
        loop {
            match chars.next()? {
                '\\' => match chars.next()? {
                    'n' => value.push('\n'),
                    other => value.push(other),
                },
                '"' => break,
                c => value.push(c),
            }
        }
        labels.push((key.trim().to_string(), value));
    }
}
