//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use todo_service::{db, HttpServer, ServiceConfig, TodoService};

pub const USER: &str = "alice";
pub const PASSWORD: &str = "s3cret";

/// A server backed by a throwaway SQLite file.
pub struct TestApp {
    pub server: HttpServer,
    pub service: TodoService,
    _dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.server.router()
    }
}

pub fn test_config(dir: &TempDir) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.database.path = dir.path().join("todo.db");
    config.auth.user_id = Some(USER.into());
    config.auth.password = Some(PASSWORD.into());
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(tweak: impl FnOnce(&mut ServiceConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir);
    tweak(&mut config);

    let pool = db::connect(&config.database).await.unwrap();
    db::migrate(&pool).await.unwrap();
    let service = TodoService::new(pool);

    TestApp {
        server: HttpServer::new(config, service.clone()),
        service,
        _dir: dir,
    }
}

pub fn auth_header() -> String {
    format!("Basic {}", STANDARD.encode(format!("{USER}:{PASSWORD}")))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

/// Send one request through the router in-process.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    authorized: bool,
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::USER_AGENT, "Mozilla/5.0 (X11; Linux x86_64)");
    if authorized {
        builder = builder.header(header::AUTHORIZATION, auth_header());
    }
    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
        text,
    }
}

/// Send a raw (possibly malformed) body with credentials.
pub async fn send_raw(router: &Router, method: Method, uri: &str, body: &'static str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, auth_header())
        .body(Body::from(body))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        headers,
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        text: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub async fn row_count(service: &TodoService) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM todos")
        .fetch_one(service.pool())
        .await
        .unwrap()
}
