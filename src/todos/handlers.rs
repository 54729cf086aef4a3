//! HTTP handlers for `/todos`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::todos::error::TodoError;
use crate::todos::model::{CreateTodo, Todo, UpdateTodo};
use crate::todos::store::TodoStore;

pub async fn find_all(State(store): State<Arc<TodoStore>>) -> Json<Vec<Todo>> {
    tracing::info!("GET /todos - Fetching all todos");
    let todos = store.find_all();
    tracing::info!(count = todos.len(), "GET /todos - Returned todos");
    Json(todos)
}

pub async fn find_one(
    State(store): State<Arc<TodoStore>>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, TodoError> {
    tracing::info!(todo_id = %id, "GET /todos/:id - Fetching todo");
    let todo = store.find_one(&id)?;
    tracing::info!(todo_id = %id, "GET /todos/:id - Todo found");
    Ok(Json(todo))
}

pub async fn create(
    State(store): State<Arc<TodoStore>>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), TodoError> {
    tracing::info!(title = %input.title, "POST /todos - Creating new todo");
    let todo = store.create(input)?;
    tracing::info!(todo_id = %todo.id, "POST /todos - Todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update(
    State(store): State<Arc<TodoStore>>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateTodo>,
) -> Result<Json<Todo>, TodoError> {
    tracing::info!(todo_id = %id, "PUT /todos/:id - Updating todo");
    let todo = store.update(&id, patch)?;
    tracing::info!(todo_id = %id, "PUT /todos/:id - Todo updated successfully");
    Ok(Json(todo))
}

pub async fn delete(
    State(store): State<Arc<TodoStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode, TodoError> {
    tracing::info!(todo_id = %id, "DELETE /todos/:id - Deleting todo");
    store.delete(&id)?;
    tracing::info!(todo_id = %id, "DELETE /todos/:id - Todo deleted successfully");
    Ok(StatusCode::NO_CONTENT)
}
