use std::sync::Arc;

use tracing::info;

use crate::config::{default_todo_db_path, StorageConfig};
use crate::error::{Result, TodoServiceError};
use crate::interfaces::backend::TodoBackend;
use crate::providers::memory::InMemoryTodoBackend;
use crate::providers::sqlite::SqliteTodoBackend;

pub const MEMORY_BACKEND: &str = "memory";
pub const SQLITE_BACKEND: &str = "sqlite";

pub async fn create_backend(config: &StorageConfig) -> Result<Arc<dyn TodoBackend>> {
    let kind = config
        .backend
        .as_deref()
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| SQLITE_BACKEND.to_string());

    match kind.as_str() {
        MEMORY_BACKEND => {
            let seed = config.seed.clone().unwrap_or_default();
            info!(seeded = seed.len(), "using in-memory todo backend");
            Ok(Arc::new(InMemoryTodoBackend::with_items(seed)))
        }
        SQLITE_BACKEND => {
            let path = config
                .sqlite_path
                .as_deref()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_todo_db_path);
            if is_in_memory_sqlite(&path) {
                return Err(TodoServiceError::Config(format!(
                    "sqlite path '{path}' is an in-memory database; use the '{MEMORY_BACKEND}' backend instead"
                )));
            }
            Ok(Arc::new(SqliteTodoBackend::new(path).await?))
        }
        other => Err(TodoServiceError::Config(format!(
            "unknown storage backend '{other}' (expected '{MEMORY_BACKEND}' or '{SQLITE_BACKEND}')"
        ))),
    }
}

// Each pooled connection would open its own private in-memory database.
fn is_in_memory_sqlite(path: &str) -> bool {
    path == ":memory:" || path.contains("mode=memory")
}
