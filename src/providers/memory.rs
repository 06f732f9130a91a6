use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domains::todo::{Todo, TodoInput};
use crate::error::{Result, TodoServiceError};
use crate::interfaces::backend::TodoBackend;

struct MemoryState {
    items: Vec<Todo>,
    // Only ever grows, so ids are not reused after a delete. Wider than the
    // id type so the counter can step past the last assignable id.
    next_id: i64,
    closed: bool,
}

pub struct InMemoryTodoBackend {
    state: RwLock<MemoryState>,
}

impl Default for InMemoryTodoBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTodoBackend {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                items: Vec::new(),
                next_id: 1,
                closed: false,
            }),
        }
    }

    /// Seeds the collection; items receive ids `1..=n` in the given order.
    pub fn with_items(items: impl IntoIterator<Item = TodoInput>) -> Self {
        let items: Vec<Todo> = items
            .into_iter()
            .zip(1..=i32::MAX)
            .map(|(input, id)| Todo {
                id,
                title: input.title,
                done: input.done,
            })
            .collect();
        let next_id = items.last().map_or(0, |item| i64::from(item.id)) + 1;
        Self {
            state: RwLock::new(MemoryState {
                items,
                next_id,
                closed: false,
            }),
        }
    }
}

fn ensure_open(state: &MemoryState) -> Result<()> {
    if state.closed {
        return Err(TodoServiceError::Backend("store is closed".to_string()));
    }
    Ok(())
}

#[async_trait]
impl TodoBackend for InMemoryTodoBackend {
    async fn list(&self) -> Result<Vec<Todo>> {
        let guard = self.state.read().await;
        ensure_open(&guard)?;
        Ok(guard.items.clone())
    }

    async fn create(&self, title: &str, done: bool) -> Result<Todo> {
        let mut guard = self.state.write().await;
        ensure_open(&guard)?;
        let id = i32::try_from(guard.next_id)
            .map_err(|_| TodoServiceError::Backend("todo id space exhausted".to_string()))?;
        let todo = Todo {
            id,
            title: title.to_string(),
            done,
        };
        guard.next_id += 1;
        guard.items.push(todo.clone());
        Ok(todo)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Todo>> {
        let guard = self.state.read().await;
        ensure_open(&guard)?;
        Ok(guard.items.iter().find(|item| item.id == id).cloned())
    }

    async fn update(&self, id: i32, title: &str, done: bool) -> Result<Todo> {
        let mut guard = self.state.write().await;
        ensure_open(&guard)?;
        match guard.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.title = title.to_string();
                item.done = done;
            }
            None => debug!(id, "update against missing todo left store unchanged"),
        }
        Ok(Todo {
            id,
            title: title.to_string(),
            done,
        })
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let mut guard = self.state.write().await;
        ensure_open(&guard)?;
        guard.items.retain(|item| item.id != id);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.state.write().await;
        guard.closed = true;
        Ok(())
    }
}
