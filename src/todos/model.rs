//! Todo records and request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// A fresh, pending todo with a generated id.
    pub fn new(input: CreateTodo) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Body of `POST /todos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Body of `PUT /todos/{id}`. Absent fields are left unchanged; an explicit
/// `"description": null` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// Merge the supplied fields over `todo`. `id` and `created_at` are
    /// never touched.
    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

/// Only called for keys present in the payload, so `null` becomes
/// `Some(None)` while a missing key stays `None` via `default`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_todo_is_pending() {
        let todo = Todo::new(CreateTodo::new("Buy milk"));
        assert!(!todo.completed);
        assert_eq!(todo.id.len(), 36);
        assert!(todo.created_at <= Utc::now());
    }

    #[test]
    fn test_update_only_touches_supplied_fields() {
        let mut todo = Todo::new(CreateTodo::new("Buy milk").with_description("2 litres"));
        let before = todo.clone();

        UpdateTodo {
            completed: Some(true),
            ..Default::default()
        }
        .apply_to(&mut todo);

        assert!(todo.completed);
        assert_eq!(todo.title, before.title);
        assert_eq!(todo.description, before.description);
        assert_eq!(todo.id, before.id);
        assert_eq!(todo.created_at, before.created_at);
    }

    #[test]
    fn test_update_overwrites_with_falsy_values() {
        let mut todo = Todo::new(CreateTodo::new("Buy milk").with_description("2 litres"));
        todo.completed = true;

        UpdateTodo {
            title: None,
            description: Some(Some(String::new())),
            completed: Some(false),
        }
        .apply_to(&mut todo);

        assert!(!todo.completed);
        assert_eq!(todo.description.as_deref(), Some(""));
    }

    #[test]
    fn test_json_shape() {
        let todo = Todo::new(CreateTodo::new("Buy milk"));
        let json = serde_json::to_value(&todo).unwrap();

        assert!(json.get("createdAt").is_some());
        assert!(json.get("description").is_none());
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn test_update_payload_ignores_identity_fields() {
        let patch: UpdateTodo =
            serde_json::from_str(r#"{"id":"other","completed":true,"createdAt":"2020-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(
            patch,
            UpdateTodo {
                completed: Some(true),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_update_description_null_clears_it() {
        let cleared: UpdateTodo = serde_json::from_str(r#"{"description":null}"#).unwrap();
        let untouched: UpdateTodo = serde_json::from_str(r#"{"title":"Buy oat milk"}"#).unwrap();
        let replaced: UpdateTodo = serde_json::from_str(r#"{"description":"1 litre"}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert_eq!(untouched.description, None);
        assert_eq!(replaced.description, Some(Some("1 litre".to_string())));

        let mut todo = Todo::new(CreateTodo::new("Buy milk").with_description("2 litres"));
        untouched.apply_to(&mut todo);
        assert_eq!(todo.description.as_deref(), Some("2 litres"));
        cleared.apply_to(&mut todo);
        assert_eq!(todo.description, None);
        assert_eq!(todo.title, "Buy oat milk");
    }
}
