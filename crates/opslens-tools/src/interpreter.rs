//! HTTP client for the remote code-interpreter service.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::BackendError;
use crate::config::InterpreterConfig;
use crate::http_client::build_http_client;

/// The single language tag the interpreter service accepts.
pub const INTERPRETER_LANGUAGE: &str = "python";

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    language: &'a str,
    source_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_files: Option<&'a [String]>,
}

/// Raw reply from one execution request.
///
/// `files` maps each reported file path to the backend's content hash.
/// A `BTreeMap` keeps artifact order stable across repeated listings of
/// the same execution.
#[derive(Debug, Clone, Deserialize)]
pub struct InterpreterReply {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub exit_code: i32,
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

/// Client for the interpreter's `/v1/execute` endpoint.
///
/// Performs exactly one round-trip per call and never retries; retrying
/// a tool call is the agent's decision, not the transport's.
#[derive(Clone)]
pub struct InterpreterClient {
    client: reqwest::Client,
    execute_url: String,
    timeout: Duration,
}

impl InterpreterClient {
    pub fn new(config: &InterpreterConfig) -> Self {
        Self {
            client: build_http_client(),
            execute_url: format!("{}/v1/execute", config.base_url),
            timeout: config.timeout,
        }
    }

    /// Execute one source payload, returning the raw backend reply.
    pub async fn execute(
        &self,
        language: &str,
        source: &str,
        input_files: &[String],
        timeout: Option<Duration>,
    ) -> Result<InterpreterReply, BackendError> {
        let timeout = timeout.unwrap_or(self.timeout);
        let request = ExecuteRequest {
            language,
            source_code: source,
            input_files: (!input_files.is_empty()).then_some(input_files),
        };

        tracing::debug!(url = %self.execute_url, "dispatching code execution");
        let response = self
            .client
            .post(&self.execute_url)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|error| map_transport_error(error, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Rejected(format!(
                "Code interpreter returned error {}: {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json::<InterpreterReply>()
            .await
            .map_err(|error| BackendError::MalformedReply(error.to_string()))
    }
}

fn map_transport_error(error: reqwest::Error, timeout: Duration) -> BackendError {
    if error.is_connect() {
        BackendError::Connection(error.to_string())
    } else if error.is_timeout() {
        BackendError::Timeout(timeout)
    } else if error.is_decode() {
        BackendError::MalformedReply(error.to_string())
    } else {
        BackendError::Internal(error.to_string())
    }
}
