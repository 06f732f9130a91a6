use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domains::todo::TodoInput;
use crate::error::{Result, TodoServiceError};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// `"memory"` or `"sqlite"`; sqlite when unset.
    pub backend: Option<String>,
    pub sqlite_path: Option<String>,
    /// Initial items for the memory backend.
    pub seed: Option<Vec<TodoInput>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub server: Option<ServerConfig>,
    pub storage: Option<StorageConfig>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| TodoServiceError::Config(e.to_string()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| TodoServiceError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn host(&self) -> String {
        self.server
            .as_ref()
            .and_then(|server| server.host.as_deref())
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|server| server.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }
}

pub fn default_todo_db_path() -> String {
    "./data/todos.db".to_string()
}
