pub mod config;
pub mod daemon;
pub mod domains;
pub mod error;
pub mod factories;
pub mod interfaces;
pub mod providers;
pub mod services;

pub use crate::config::Config;
pub use crate::domains::todo::{Todo, TodoInput};
pub use crate::error::{Result, TodoServiceError};
pub use crate::interfaces::backend::TodoBackend;
pub use crate::services::todos::TodoService;
