#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

use todo_service::daemon::{build_router, AppState};
use todo_service::domains::todo::{Todo, TodoInput};
use todo_service::error::{Result, TodoServiceError};
use todo_service::interfaces::backend::TodoBackend;
use todo_service::providers::memory::InMemoryTodoBackend;
use todo_service::services::todos::TodoService;

/// Wraps the in-memory backend, records every call, and fails the
/// operations it has been told to fail.
pub struct ScriptedBackend {
    inner: InMemoryTodoBackend,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(inner: InMemoryTodoBackend) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, op: &'static str) -> Self {
        self.failing.get_mut().insert(op);
        self
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, op: &'static str) -> Result<()> {
        self.calls.lock().await.push(op.to_string());
        if self.failing.lock().await.contains(op) {
            return Err(TodoServiceError::Backend("database error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TodoBackend for ScriptedBackend {
    async fn list(&self) -> Result<Vec<Todo>> {
        self.record("list").await?;
        self.inner.list().await
    }

    async fn create(&self, title: &str, done: bool) -> Result<Todo> {
        self.record("create").await?;
        self.inner.create(title, done).await
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Todo>> {
        self.record("get_by_id").await?;
        self.inner.get_by_id(id).await
    }

    async fn update(&self, id: i32, title: &str, done: bool) -> Result<Todo> {
        self.record("update").await?;
        self.inner.update(id, title, done).await
    }

    async fn delete(&self, id: i32) -> Result<()> {
        self.record("delete").await?;
        self.inner.delete(id).await
    }

    async fn close(&self) -> Result<()> {
        self.record("close").await?;
        self.inner.close().await
    }
}

pub fn seeded_backend() -> InMemoryTodoBackend {
    InMemoryTodoBackend::with_items(vec![
        TodoInput::new("Learn Go", false),
        TodoInput::new("Set up CI/CD", false),
    ])
}

pub fn router_for(backend: Arc<dyn TodoBackend>) -> Router {
    build_router(AppState {
        service: TodoService::new(backend),
    })
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(raw) => {
            builder = builder.header("content-type", "application/json");
            Body::from(raw.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
