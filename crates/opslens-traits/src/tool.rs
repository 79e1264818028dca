//! Tool trait and observation types for agent tools.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;

/// Type alias for secret resolution callbacks supplied by the host
/// framework. Returns `None` when a secret is not configured.
pub type SecretResolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// JSON Schema for tool parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema object
}

/// Fixed failure taxonomy for tool observations.
///
/// Every failure reachable from a backend call maps to exactly one kind;
/// anything unmapped falls back to `Internal`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Malformed or empty payload, detected before any backend call.
    InputInvalid,
    /// Required connection parameters were not resolved.
    CredentialsMissing,
    /// Transport or network failure reaching the backend.
    ConnectionFailed,
    /// The backend call did not complete within the allotted time.
    Timeout,
    /// The backend was reached but reported a domain error.
    BackendRejected,
    /// Execution completed with a degraded but partially usable outcome.
    PartialResult,
    /// Anything not otherwise classified. A bug signal for operators.
    Internal,
}

impl ToolErrorKind {
    /// Machine-stable code carried in observations.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InputInvalid => "input_invalid",
            Self::CredentialsMissing => "credentials_missing",
            Self::ConnectionFailed => "connection_failed",
            Self::Timeout => "timeout",
            Self::BackendRejected => "backend_rejected",
            Self::PartialResult => "partial_result",
            Self::Internal => "internal",
        }
    }

    /// Whether re-invoking the tool with the same input can plausibly
    /// succeed. Retries themselves are the calling agent's decision.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::ConnectionFailed | Self::Timeout)
    }
}

/// Result of tool execution, as observed by the agent loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub result: Value,
    pub error: Option<String>,
    pub error_kind: Option<ToolErrorKind>,
    pub retryable: Option<bool>,
}

impl ToolOutput {
    /// Create a successful tool output.
    pub fn success(result: Value) -> Self {
        Self {
            success: true,
            result,
            error: None,
            error_kind: None,
            retryable: None,
        }
    }

    /// Create a classified error output.
    pub fn error(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: Value::Null,
            error: Some(message.into()),
            error_kind: Some(kind),
            retryable: Some(kind.retryable()),
        }
    }

    pub fn with_error_kind(mut self, kind: ToolErrorKind) -> Self {
        self.error_kind = Some(kind);
        self
    }
}

/// Core trait for agent tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name (used in LLM function calls).
    fn name(&self) -> &str;

    /// Human-readable description for LLM context.
    fn description(&self) -> &str;

    /// JSON Schema for input parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given input.
    ///
    /// Implementations return `Ok(ToolOutput)` on every reachable path,
    /// including invalid input and classified backend failures; an `Err`
    /// here would abort the agent's whole reasoning turn instead of
    /// becoming one failed observation.
    async fn execute(&self, input: Value) -> Result<ToolOutput>;

    /// Whether this tool supports parallel execution by default.
    /// Override to false for tools with side effects.
    fn supports_parallel(&self) -> bool {
        true
    }

    /// Build complete schema for LLM.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
