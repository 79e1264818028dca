//! Error types for the tool layer.

use thiserror::Error;

/// Tool layer error types
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;
