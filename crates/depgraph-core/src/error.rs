use thiserror::Error;

use crate::ConfigError;

#[derive(Error, Debug)]
pub enum DepGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Action failed for dependency '{dependency}': {message}")]
    Action { dependency: String, message: String },
}

impl DepGraphError {
    pub fn action(dependency: impl Into<String>, message: impl Into<String>) -> Self {
        DepGraphError::Action {
            dependency: dependency.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DepGraphError>;
