//! In-memory todo store.
//!
//! # Responsibilities
//! - CRUD over an insertion-ordered list of todos
//! - Wrap every operation in a `TodosService.<op>` span
//! - Record operation outcomes, error classifications and the
//!   completed/pending gauge
//!
//! # Design Decisions
//! - One mutex guards the whole list; every operation holds it for its full
//!   read-modify-write, `update` included
//! - The gauge is recomputed from a full scan after each mutation
//! - NotFound is classified once, by the lookup that detects it

use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::observability::{ActiveSpan, ErrorKind, MetricsRegistry, Operation, Outcome, Tracer};
use crate::todos::error::TodoError;
use crate::todos::model::{CreateTodo, Todo, UpdateTodo};

/// Span name for a store operation.
pub fn span_name(operation: Operation) -> String {
    format!("TodosService.{}", operation)
}

pub struct TodoStore {
    todos: Mutex<Vec<Todo>>,
    metrics: Arc<MetricsRegistry>,
    tracer: Tracer,
}

impl TodoStore {
    pub fn new(metrics: Arc<MetricsRegistry>, tracer: Tracer) -> Self {
        Self {
            todos: Mutex::new(Vec::new()),
            metrics,
            tracer,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Todo>>, TodoError> {
        self.todos
            .lock()
            .map_err(|_| TodoError::Unknown("todo store lock poisoned".to_string()))
    }

    fn publish_counts(&self, todos: &[Todo]) {
        let completed = todos.iter().filter(|t| t.completed).count();
        let pending = todos.iter().filter(|t| !t.completed).count();
        self.metrics.set_todo_count(completed, pending);
    }

    /// Every todo, in insertion order.
    pub fn find_all(&self) -> Vec<Todo> {
        let result: Result<Vec<Todo>, Infallible> = self.tracer.in_span(span_name(Operation::FindAll), |span| {
            tracing::info!("Fetching all todos");
            let todos = self.todos.lock().unwrap_or_else(PoisonError::into_inner);
            tracing::debug!(count = todos.len(), "Current todos count");
            span.set_attribute("todo.count", todos.len() as i64);
            self.metrics.increment_operation_counter(Operation::FindAll, Outcome::Success);
            Ok(todos.clone())
        });
        result.unwrap_or_else(|never| match never {})
    }

    pub fn find_one(&self, id: &str) -> Result<Todo, TodoError> {
        self.tracer.in_span(span_name(Operation::FindOne), |span| {
            let todos = self
                .lock()
                .inspect_err(|_| self.metrics.increment_error_counter(Operation::FindOne, ErrorKind::Unknown))?;
            let index = self.locate(&todos, id, span)?;
            Ok(todos[index].clone())
        })
    }

    /// Position of `id` in `todos`, recording the findOne outcome.
    fn locate(&self, todos: &[Todo], id: &str, span: &mut ActiveSpan) -> Result<usize, TodoError> {
        tracing::info!(todo_id = %id, "Fetching todo");
        span.set_attribute("todo.id", id.to_string());

        match todos.iter().position(|t| t.id == id) {
            Some(index) => {
                tracing::debug!(todo_id = %id, title = %todos[index].title, "Found todo");
                self.metrics.increment_operation_counter(Operation::FindOne, Outcome::Success);
                Ok(index)
            }
            None => {
                tracing::warn!(todo_id = %id, "Todo not found");
                self.metrics.increment_operation_counter(Operation::FindOne, Outcome::Failure);
                self.metrics.increment_error_counter(Operation::FindOne, ErrorKind::NotFound);
                Err(TodoError::NotFound(id.to_string()))
            }
        }
    }

    pub fn create(&self, input: CreateTodo) -> Result<Todo, TodoError> {
        self.tracer.in_span(span_name(Operation::Create), |span| {
            tracing::info!(title = %input.title, "Creating new todo");

            let result = self.insert(input);
            match &result {
                Ok(todo) => {
                    span.set_attribute("todo.id", todo.id.clone());
                    tracing::info!(todo_id = %todo.id, title = %todo.title, "Todo created successfully");
                    tracing::debug!(todo = ?todo, "Todo details");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create todo");
                    self.metrics.increment_operation_counter(Operation::Create, Outcome::Failure);
                    self.metrics.increment_error_counter(Operation::Create, ErrorKind::Unknown);
                }
            }
            result
        })
    }

    fn insert(&self, input: CreateTodo) -> Result<Todo, TodoError> {
        let mut todos = self.lock()?;
        let todo = Todo::new(input);
        todos.push(todo.clone());

        self.metrics.increment_operation_counter(Operation::Create, Outcome::Success);
        self.publish_counts(&todos);
        Ok(todo)
    }

    pub fn update(&self, id: &str, patch: UpdateTodo) -> Result<Todo, TodoError> {
        self.tracer.in_span(span_name(Operation::Update), |span| {
            span.set_attribute("todo.id", id.to_string());
            tracing::info!(todo_id = %id, updates = ?patch, "Updating todo");

            let result = self.replace(id, patch);
            match &result {
                Ok(_) => {
                    tracing::info!(todo_id = %id, "Todo updated successfully");
                    self.metrics.increment_operation_counter(Operation::Update, Outcome::Success);
                }
                Err(e) => {
                    self.metrics.increment_operation_counter(Operation::Update, Outcome::Failure);
                    if !e.is_not_found() {
                        tracing::error!(todo_id = %id, error = %e, "Failed to update todo");
                        self.metrics.increment_error_counter(Operation::Update, e.kind());
                    }
                }
            }
            result
        })
    }

    fn replace(&self, id: &str, patch: UpdateTodo) -> Result<Todo, TodoError> {
        let mut todos = self.lock()?;
        let index = self
            .tracer
            .in_span(span_name(Operation::FindOne), |span| self.locate(&todos, id, span))?;

        let mut updated = todos[index].clone();
        patch.apply_to(&mut updated);
        todos[index] = updated.clone();

        self.publish_counts(&todos);
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<(), TodoError> {
        self.tracer.in_span(span_name(Operation::Delete), |span| {
            span.set_attribute("todo.id", id.to_string());
            tracing::info!(todo_id = %id, "Deleting todo");

            let mut todos = self
                .lock()
                .inspect_err(|_| self.metrics.increment_error_counter(Operation::Delete, ErrorKind::Unknown))?;

            let Some(index) = todos.iter().position(|t| t.id == id) else {
                tracing::warn!(todo_id = %id, "Todo not found for deletion");
                self.metrics.increment_operation_counter(Operation::Delete, Outcome::Failure);
                self.metrics.increment_error_counter(Operation::Delete, ErrorKind::NotFound);
                return Err(TodoError::NotFound(id.to_string()));
            };

            todos.remove(index);
            span.add_event("todo.removed");
            tracing::info!(todo_id = %id, "Todo deleted successfully");
            tracing::debug!(remaining_count = todos.len(), "Remaining todos count");

            self.metrics.increment_operation_counter(Operation::Delete, Outcome::Success);
            self.publish_counts(&todos);
            Ok(())
        })
    }
}
