//! `/todos` handlers.
//!
//! `POST` create, `GET` list, `PUT` update, `DELETE` delete. Any other
//! method gets 405 with an `Allow` header from the method router.

use axum::{
    extract::{Query, State},
    routing::{get, MethodRouter},
    Json,
};
use serde::Deserialize;

use crate::http::request::JsonBody;
use crate::http::response::ApiError;
use crate::model::todo::{
    CreateTodoRequest, CreateTodoResponse, DeleteTodosRequest, DeleteTodosResponse,
    ReadTodosResponse, UpdateTodoRequest, UpdateTodoResponse,
};
use crate::service::TodoService;

const DEFAULT_PAGE_SIZE: i64 = 10;

/// The `/todos` method router, ready to terminate a pipeline.
pub fn routes(service: TodoService) -> MethodRouter {
    get(read_todos)
        .post(create_todo)
        .put(update_todo)
        .delete(delete_todos)
        .with_state(service)
}

pub async fn create_todo(
    State(service): State<TodoService>,
    JsonBody(req): JsonBody<CreateTodoRequest>,
) -> Result<Json<CreateTodoResponse>, ApiError> {
    if req.subject.is_empty() {
        return Err(ApiError::bad_request("subject is required"));
    }

    let todo = service.create_todo(&req.subject, &req.description).await?;
    Ok(Json(CreateTodoResponse { todo }))
}

/// Raw `GET /todos` query. Values stay strings so empty ones can mean "absent".
#[derive(Debug, Default, Deserialize)]
pub struct ReadTodosQuery {
    pub prev_id: Option<String>,
    pub size: Option<String>,
}

impl ReadTodosQuery {
    /// Validate into `(prev_id, size)`.
    pub fn parse(&self) -> Result<(i64, i64), ApiError> {
        let prev_id = match non_empty(&self.prev_id) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) if id >= 0 => id,
                _ => return Err(ApiError::bad_request("prev_id must be a non-negative integer")),
            },
            None => 0,
        };

        let size = match non_empty(&self.size) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ApiError::bad_request("size must be a positive integer")),
            },
            None => DEFAULT_PAGE_SIZE,
        };

        Ok((prev_id, size))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub async fn read_todos(
    State(service): State<TodoService>,
    query: Result<Query<ReadTodosQuery>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<ReadTodosResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (prev_id, size) = query.parse()?;

    let todos = service.read_todos(prev_id, size).await?;
    Ok(Json(ReadTodosResponse { todos }))
}

pub async fn update_todo(
    State(service): State<TodoService>,
    JsonBody(req): JsonBody<UpdateTodoRequest>,
) -> Result<Json<UpdateTodoResponse>, ApiError> {
    if req.id <= 0 {
        return Err(ApiError::bad_request("id must be positive"));
    }
    if req.subject.is_empty() {
        return Err(ApiError::bad_request("subject is required"));
    }

    let todo = service
        .update_todo(req.id, &req.subject, &req.description)
        .await?;
    Ok(Json(UpdateTodoResponse { todo }))
}

pub async fn delete_todos(
    State(service): State<TodoService>,
    JsonBody(req): JsonBody<DeleteTodosRequest>,
) -> Result<Json<DeleteTodosResponse>, ApiError> {
    if req.ids.is_empty() {
        return Err(ApiError::bad_request("ids must not be empty"));
    }

    service.delete_todos(&req.ids).await?;
    Ok(Json(DeleteTodosResponse {}))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(prev_id: Option<&str>, size: Option<&str>) -> ReadTodosQuery {
        ReadTodosQuery {
            prev_id: prev_id.map(String::from),
            size: size.map(String::from),
        }
    }

    #[test]
    fn defaults_when_absent_or_empty() {
        assert_eq!(query(None, None).parse().unwrap(), (0, DEFAULT_PAGE_SIZE));
        assert_eq!(query(Some(""), Some("")).parse().unwrap(), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn accepts_valid_values() {
        assert_eq!(query(Some("12"), Some("3")).parse().unwrap(), (12, 3));
        assert_eq!(query(Some("0"), None).parse().unwrap(), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn rejects_invalid_values() {
        for (prev_id, size) in [
            (Some("-1"), None),
            (Some("abc"), None),
            (None, Some("0")),
            (None, Some("-5")),
            (None, Some("ten")),
        ] {
            assert!(
                matches!(query(prev_id, size).parse(), Err(ApiError::BadRequest(_))),
                "prev_id={prev_id:?} size={size:?}"
            );
        }
    }
}
