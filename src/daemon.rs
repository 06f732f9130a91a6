use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::domains::todo::TodoInput;
use crate::error::{Result, TodoServiceError};
use crate::factories::backend_factory::create_backend;
use crate::interfaces::backend::TodoBackend;
use crate::services::todos::TodoService;

#[derive(Clone)]
pub struct AppState {
    pub service: TodoService,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn list_todos(State(state): State<AppState>) -> Response {
    match state.service.list().await {
        Ok(todos) => (StatusCode::OK, Json(todos)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_todo(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TodoInput>, JsonRejection>,
) -> Response {
    let input = match parse_body(payload) {
        Ok(input) => input,
        Err(err) => return error_response(err),
    };

    match state.service.create(input).await {
        Ok(todo) => (StatusCode::CREATED, Json(todo)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_todo(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return error_response(err),
    };

    match state.service.get(id).await {
        Ok(todo) => (StatusCode::OK, Json(todo)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn update_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: std::result::Result<Json<TodoInput>, JsonRejection>,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return error_response(err),
    };
    let input = match parse_body(payload) {
        Ok(input) => input,
        Err(err) => return error_response(err),
    };

    match state.service.update(id, input).await {
        Ok(todo) => (StatusCode::OK, Json(todo)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_todo(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return error_response(err),
    };

    match state.service.delete(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Todo deleted".to_string(),
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn parse_id(raw: &str) -> Result<i32> {
    raw.parse::<i32>()
        .map_err(|_| TodoServiceError::InvalidInput("Invalid ID".to_string()))
}

fn parse_body(payload: std::result::Result<Json<TodoInput>, JsonRejection>) -> Result<TodoInput> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| TodoServiceError::InvalidInput(rejection.body_text()))
}

fn status_for(err: &TodoServiceError) -> StatusCode {
    match err {
        TodoServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TodoServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: TodoServiceError) -> Response {
    let status = status_for(&err);
    let error = match &err {
        TodoServiceError::InvalidInput(message) => message.clone(),
        TodoServiceError::NotFound(_) => "Todo not found".to_string(),
        other => other.to_string(),
    };
    if !err.is_client_error() {
        warn!(error = %err, "request failed");
    }
    (status, Json(ErrorResponse { error })).into_response()
}

pub async fn run(config: Config) -> Result<()> {
    run_with_shutdown(config, futures::future::pending::<()>()).await
}

pub async fn run_with_shutdown<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let backend = create_backend(&config.storage()).await?;
    serve_with_backend(&config, backend, shutdown).await
}

/// Serves until `shutdown` resolves, then closes the backend. The backend
/// is closed even when binding or serving fails.
pub async fn serve_with_backend<F>(
    config: &Config,
    backend: Arc<dyn TodoBackend>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let service = TodoService::new(backend);

    let served = serve(config, service.clone(), shutdown).await;
    let closed = service.close().await;
    served?;
    closed?;

    info!("todo service stopped");
    Ok(())
}

async fn serve<F>(config: &Config, service: TodoService, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(AppState { service });

    let addr = format!("{}:{}", config.host(), config.port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TodoServiceError::Runtime(e.to_string()))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| TodoServiceError::Runtime(e.to_string()))?;
    info!(%local_addr, "todo service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| TodoServiceError::Runtime(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids_only() {
        assert_eq!(parse_id("7").unwrap(), 7);
        assert!(matches!(
            parse_id("abc"),
            Err(TodoServiceError::InvalidInput(message)) if message == "Invalid ID"
        ));
        assert!(parse_id("99999999999").is_err());
        assert!(parse_id(" 1").is_err());
        assert!(parse_id("1 ").is_err());
    }

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(
            status_for(&TodoServiceError::InvalidInput("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&TodoServiceError::NotFound(1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&TodoServiceError::Backend("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
