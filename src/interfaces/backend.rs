use async_trait::async_trait;

use crate::domains::todo::Todo;
use crate::error::Result;

/// Keyed storage for todo items.
///
/// `get_by_id` reports absence as `Ok(None)`, never as an error. `update`
/// does not check that the id exists; callers are expected to look the item
/// up first. `delete` of a missing id succeeds. After `close`, every other
/// operation fails with `TodoServiceError::Backend`.
#[async_trait]
pub trait TodoBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<Todo>>;

    async fn create(&self, title: &str, done: bool) -> Result<Todo>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Todo>>;

    async fn update(&self, id: i32, title: &str, done: bool) -> Result<Todo>;

    async fn delete(&self, id: i32) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
