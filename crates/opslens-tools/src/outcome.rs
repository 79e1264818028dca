//! Normalized execution outcomes and their observation envelopes.
//!
//! Both backends reduce to one `ExecutionOutcome` shape here, so the
//! agent-facing contract is uniform regardless of which service did the
//! work.

use serde::Serialize;
use serde_json::{Value, json};

use opslens_traits::{ToolErrorKind, ToolOutput};

use crate::artifact::ArtifactReference;
use crate::interpreter::InterpreterReply;
use crate::postgres::QueryReply;
use crate::render;

const NO_OUTPUT_MESSAGE: &str = "Code executed successfully (no output)";

/// Tri-state outcome of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    /// Nonzero exit with usable stdout; the agent may still want it.
    PartialFailure,
    Failure,
}

/// Normalized result of one tool invocation, independent of backend.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    pub primary_output: String,
    pub diagnostic_output: Option<String>,
    pub artifacts: Vec<ArtifactReference>,
    pub affected_rows: Option<u64>,
}

impl ExecutionOutcome {
    /// Normalize a code-interpreter reply.
    pub fn from_interpreter(reply: &InterpreterReply, correlation_id: &str) -> Self {
        let artifacts: Vec<ArtifactReference> = reply
            .files
            .keys()
            .map(|path| ArtifactReference::new(correlation_id, path))
            .collect();
        let stdout = reply.stdout.trim();
        let stderr = reply.stderr.trim();

        if reply.exit_code == 0 {
            if !stderr.is_empty() {
                // Success keeps its no-diagnostic contract; warnings go
                // to the log.
                tracing::debug!(stderr, "stderr from successful execution discarded");
            }
            let primary = if stdout.is_empty() {
                NO_OUTPUT_MESSAGE.to_string()
            } else {
                stdout.to_string()
            };
            return Self {
                status: ExecutionStatus::Success,
                primary_output: primary,
                diagnostic_output: None,
                artifacts,
                affected_rows: None,
            };
        }

        let diagnostic = if stderr.is_empty() {
            format!("Exit code: {}", reply.exit_code)
        } else {
            format!("Exit code: {}\n{}", reply.exit_code, stderr)
        };

        if stdout.is_empty() {
            Self {
                status: ExecutionStatus::Failure,
                primary_output: String::new(),
                diagnostic_output: Some(diagnostic),
                artifacts,
                affected_rows: None,
            }
        } else {
            Self {
                status: ExecutionStatus::PartialFailure,
                primary_output: stdout.to_string(),
                diagnostic_output: Some(diagnostic),
                artifacts,
                affected_rows: None,
            }
        }
    }

    /// Normalize a query reply. Queries never produce artifacts.
    pub fn from_query(reply: &QueryReply) -> Self {
        match reply {
            QueryReply::Rows(rows) => Self {
                status: ExecutionStatus::Success,
                primary_output: render::render_rows(rows),
                diagnostic_output: None,
                artifacts: Vec::new(),
                affected_rows: None,
            },
            QueryReply::Affected(count) => Self {
                status: ExecutionStatus::Success,
                primary_output: render::render_affected(*count),
                diagnostic_output: None,
                artifacts: Vec::new(),
                affected_rows: Some(*count),
            },
        }
    }

    /// Convert into the observation returned to the agent loop.
    ///
    /// PartialFailure stays success-shaped with the diagnostic
    /// populated; the agent decides whether to retry or proceed. Only a
    /// Failure (nothing usable produced) becomes an error observation.
    pub fn into_output(self) -> ToolOutput {
        match self.status {
            ExecutionStatus::Success | ExecutionStatus::PartialFailure => {
                let mut body = json!({
                    "status": self.status,
                    "output": self.primary_output,
                });
                if let Some(diagnostic) = &self.diagnostic_output {
                    body["diagnostic"] = json!(diagnostic);
                }
                if !self.artifacts.is_empty() {
                    let markdown: Vec<String> = self
                        .artifacts
                        .iter()
                        .map(ArtifactReference::markdown)
                        .collect();
                    body["artifacts"] = artifact_json(&self.artifacts);
                    body["artifact_markdown"] = json!(markdown.join("\n"));
                }
                if let Some(count) = self.affected_rows {
                    body["affected_rows"] = json!(count);
                }

                let output = ToolOutput::success(body);
                if self.status == ExecutionStatus::PartialFailure {
                    output.with_error_kind(ToolErrorKind::PartialResult)
                } else {
                    output
                }
            }
            ExecutionStatus::Failure => {
                let message = self
                    .diagnostic_output
                    .unwrap_or_else(|| "Execution failed and produced no output".to_string());
                ToolOutput::error(ToolErrorKind::BackendRejected, message)
            }
        }
    }
}

fn artifact_json(artifacts: &[ArtifactReference]) -> Value {
    serde_json::to_value(artifacts).unwrap_or(Value::Null)
}
