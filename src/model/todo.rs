//! TODO entity and its request/response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single TODO row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,
    pub subject: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /todos`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTodoRequest {
    pub subject: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoResponse {
    pub todo: Todo,
}

/// Body of `PUT /todos`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTodoRequest {
    pub id: i64,
    pub subject: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodoResponse {
    pub todo: Todo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadTodosResponse {
    pub todos: Vec<Todo>,
}

/// Body of `DELETE /todos`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTodosRequest {
    pub ids: Vec<i64>,
}

/// Empty `{}` confirmation for deletes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteTodosResponse {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthzResponse {
    pub message: String,
}
