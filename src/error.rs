use thiserror::Error;

#[derive(Debug, Error)]
pub enum TodoServiceError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("todo {0} not found")]
    NotFound(i32),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl TodoServiceError {
    /// True for failures caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, TodoServiceError>;
