//! Logical handler identity for matched routes.
//!
//! The tracing middleware only sees a method and a route pattern; this
//! table maps them back to the handler that serves them.

use axum::http::Method;

pub const TODOS_PATH: &str = "/todos";
pub const TODO_PATH: &str = "/todos/{id}";

/// Which handler serves a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerInfo {
    pub controller: &'static str,
    pub handler: &'static str,
}

#[derive(Debug, Clone)]
struct RouteEntry {
    method: Method,
    path: String,
    info: HandlerInfo,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, method: Method, path: impl Into<String>, controller: &'static str, handler: &'static str) -> Self {
        self.entries.push(RouteEntry {
            method,
            path: path.into(),
            info: HandlerInfo { controller, handler },
        });
        self
    }

    /// The todo routes plus the metrics route at `metrics_path`.
    pub fn standard(metrics_path: &str) -> Self {
        Self::new()
            .with(Method::GET, TODOS_PATH, "todos", "find_all")
            .with(Method::POST, TODOS_PATH, "todos", "create")
            .with(Method::GET, TODO_PATH, "todos", "find_one")
            .with(Method::PUT, TODO_PATH, "todos", "update")
            .with(Method::DELETE, TODO_PATH, "todos", "delete")
            .with(Method::GET, metrics_path, "metrics", "render")
    }

    pub fn resolve(&self, method: &Method, route: &str) -> Option<HandlerInfo> {
        self.entries
            .iter()
            .find(|e| &e.method == method && e.path == route)
            .map(|e| e.info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_method_and_route() {
        let table = RouteTable::standard("/metrics");

        assert_eq!(
            table.resolve(&Method::PUT, TODO_PATH),
            Some(HandlerInfo { controller: "todos", handler: "update" })
        );
        assert_eq!(table.resolve(&Method::GET, "/metrics").unwrap().controller, "metrics");
        assert_eq!(table.resolve(&Method::PATCH, TODO_PATH), None);
        assert_eq!(table.resolve(&Method::GET, "/todos/abc"), None);
    }
}
