use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a todo entity as stored in the `todo` table and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Database generated identifier.
    pub id: i32,
    pub title: String,
    pub content: String,
    /// Set by the database on insert.
    pub created: DateTime<Utc>,
    /// `None` until the first full update.
    pub updated: Option<DateTime<Utc>>,
    /// Identifier of the user who created the todo.
    pub created_by: i32,
    /// Identifier of the user who last replaced the todo.
    pub updated_by: Option<i32>,
    pub done: bool,
}

/// Request body for `POST /api/v1/todos`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InsertTodoParams {
    /// Must be between 3 and 100 characters.
    #[validate(length(min = 3, max = 100, message = "must be between 3 and 100 characters"))]
    pub title: String,
    /// Must be between 3 and 1000 characters.
    #[validate(length(min = 3, max = 1000, message = "must be between 3 and 1000 characters"))]
    pub content: String,
    /// Defaults to the authenticated user when omitted.
    pub created_by: Option<i32>,
    #[serde(default)]
    pub done: bool,
}

/// Validated input for `TodoStore::insert_todo`.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub content: String,
    pub created_by: i32,
    pub done: bool,
}

impl InsertTodoParams {
    /// Resolves the creator, falling back to `caller_id`.
    pub fn into_new_todo(self, caller_id: i32) -> NewTodo {
        NewTodo {
            title: self.title,
            content: self.content,
            created_by: self.created_by.unwrap_or(caller_id),
            done: self.done,
        }
    }
}

/// Request body for `PUT /api/v1/todos/{id}`. Every mutable field is required.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoParams {
    #[validate(length(min = 3, max = 100, message = "must be between 3 and 100 characters"))]
    pub title: String,
    #[validate(length(min = 3, max = 1000, message = "must be between 3 and 1000 characters"))]
    pub content: String,
    pub created_by: i32,
    pub done: bool,
}

/// Request body for `PATCH /api/v1/todos/{id}`.
///
/// Absent and `null` fields are both treated as "leave untouched". Unknown
/// fields are rejected so a typo cannot silently become an empty patch.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TodoPatch {
    #[validate(length(min = 3, max = 100, message = "must be between 3 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 3, max = 1000, message = "must be between 3 and 1000 characters"))]
    pub content: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub done: Option<bool>,
}

/// A single value to bind in a sparse update.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Text(String),
    Integer(i32),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl TodoPatch {
    /// The present fields as `(column, value)` pairs, in column order.
    pub fn fields(&self) -> Vec<(&'static str, PatchValue)> {
        let mut fields = Vec::new();

        if let Some(title) = &self.title {
            fields.push(("title", PatchValue::Text(title.clone())));
        }
        if let Some(content) = &self.content {
            fields.push(("content", PatchValue::Text(content.clone())));
        }
        if let Some(created) = self.created {
            fields.push(("created", PatchValue::Timestamp(created)));
        }
        if let Some(updated) = self.updated {
            fields.push(("updated", PatchValue::Timestamp(updated)));
        }
        if let Some(created_by) = self.created_by {
            fields.push(("created_by", PatchValue::Integer(created_by)));
        }
        if let Some(updated_by) = self.updated_by {
            fields.push(("updated_by", PatchValue::Integer(updated_by)));
        }
        if let Some(done) = self.done {
            fields.push(("done", PatchValue::Boolean(done)));
        }

        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}
