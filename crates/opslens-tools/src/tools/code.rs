//! Sandboxed Python execution tool backed by the remote interpreter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use uuid::Uuid;

use opslens_traits::{Result, Tool, ToolErrorKind, ToolOutput};

use crate::classify;
use crate::config::InterpreterConfig;
use crate::interpreter::{INTERPRETER_LANGUAGE, InterpreterClient};
use crate::outcome::ExecutionOutcome;

#[derive(Debug, Deserialize)]
struct PythonInput {
    code: String,
    language: Option<String>,
    #[serde(default)]
    input_files: Vec<String>,
    timeout_seconds: Option<u64>,
}

/// Python code execution tool.
///
/// Dispatches source to the sandboxed interpreter service and returns
/// stdout plus references to any generated files.
pub struct PythonTool {
    client: InterpreterClient,
}

impl Default for PythonTool {
    fn default() -> Self {
        Self::new(&InterpreterConfig::from_env())
    }
}

impl PythonTool {
    pub fn new(config: &InterpreterConfig) -> Self {
        Self {
            client: InterpreterClient::new(config),
        }
    }
}

/// Collapse any language tag onto the single supported value.
///
/// The interpreter accepts exactly one language, so unrecognized tags
/// normalize rather than fail; this is the one documented coercion.
fn normalize_language(tag: Option<&str>) -> &'static str {
    if let Some(tag) = tag {
        let lowered = tag.trim().to_ascii_lowercase();
        let canonical = lowered.strip_prefix("language.").unwrap_or(&lowered);
        if !matches!(canonical, "python" | "python3" | "py") {
            tracing::debug!(tag, "unrecognized language tag, defaulting to python");
        }
    }
    INTERPRETER_LANGUAGE
}

#[async_trait]
impl Tool for PythonTool {
    fn name(&self) -> &str {
        "run_python"
    }

    fn description(&self) -> &str {
        "Execute Python code in a sandboxed interpreter. Suitable for data analysis, \
         computations, and plotting; generated files are returned as artifact references."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "Python code to execute"
                },
                "language": {
                    "type": "string",
                    "description": "Programming language tag (only python is supported)"
                },
                "input_files": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Paths of input files to make accessible to the code"
                },
                "timeout_seconds": {
                    "type": "integer",
                    "description": "Execution timeout in seconds (default: 60)"
                }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput> {
        let params: PythonInput = match serde_json::from_value(input) {
            Ok(params) => params,
            Err(error) => {
                return Ok(ToolOutput::error(
                    ToolErrorKind::InputInvalid,
                    format!("Invalid input: {error}"),
                ));
            }
        };
        if params.code.trim().is_empty() {
            return Ok(ToolOutput::error(
                ToolErrorKind::InputInvalid,
                "Code must not be empty",
            ));
        }

        let language = normalize_language(params.language.as_deref());
        let correlation_id = Uuid::new_v4().to_string();
        let timeout = params.timeout_seconds.map(Duration::from_secs);

        match self
            .client
            .execute(language, &params.code, &params.input_files, timeout)
            .await
        {
            Ok(reply) => Ok(ExecutionOutcome::from_interpreter(&reply, &correlation_id).into_output()),
            Err(error) => Ok(classify::failure_output(error)),
        }
    }
}
