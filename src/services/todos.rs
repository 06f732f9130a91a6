use std::sync::Arc;

use tracing::{debug, info};

use crate::domains::todo::{Todo, TodoInput};
use crate::error::{Result, TodoServiceError};
use crate::interfaces::backend::TodoBackend;

/// Applies collection operations against a storage backend.
///
/// Update and delete always look the item up first and fail with
/// `TodoServiceError::NotFound` without touching the backend when it is
/// absent. Backend errors are passed through unchanged.
#[derive(Clone)]
pub struct TodoService {
    backend: Arc<dyn TodoBackend>,
}

impl TodoService {
    pub fn new(backend: Arc<dyn TodoBackend>) -> Self {
        Self { backend }
    }

    pub async fn list(&self) -> Result<Vec<Todo>> {
        self.backend.list().await
    }

    pub async fn create(&self, input: TodoInput) -> Result<Todo> {
        let todo = self.backend.create(&input.title, input.done).await?;
        info!(id = todo.id, "created todo");
        Ok(todo)
    }

    pub async fn get(&self, id: i32) -> Result<Todo> {
        debug!(id, "looking up todo");
        self.backend
            .get_by_id(id)
            .await?
            .ok_or(TodoServiceError::NotFound(id))
    }

    pub async fn update(&self, id: i32, input: TodoInput) -> Result<Todo> {
        let existing = self.get(id).await?;
        debug!(id = existing.id, "updating todo");
        self.backend.update(id, &input.title, input.done).await
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let existing = self.get(id).await?;
        self.backend.delete(existing.id).await?;
        info!(id, "deleted todo");
        Ok(())
    }

    pub async fn close(&self) -> Result<()> {
        self.backend.close().await
    }
}
