//! SQL query tool backed by PostgreSQL.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use opslens_traits::{Result, SecretResolver, Tool, ToolErrorKind, ToolOutput};

use crate::backend::BackendError;
use crate::classify;
use crate::credentials::CredentialSet;
use crate::outcome::ExecutionOutcome;
use crate::postgres::QueryBackend;

const DEFAULT_DATABASE: &str = "postgres";

#[derive(Debug, Deserialize)]
struct SqlInput {
    query: String,
    database: Option<String>,
}

/// SQL query tool.
///
/// Credentials resolve once per invocation from the framework's secret
/// callback (process environment as fallback) and are passed by value
/// to the backend; the tool itself keeps no connection state beyond the
/// shared pool map.
pub struct SqlTool {
    backend: QueryBackend,
    secret_resolver: Option<SecretResolver>,
}

impl Default for SqlTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlTool {
    pub fn new() -> Self {
        Self {
            backend: QueryBackend::new(),
            secret_resolver: None,
        }
    }

    pub fn with_secret_resolver(mut self, resolver: SecretResolver) -> Self {
        self.secret_resolver = Some(resolver);
        self
    }
}

#[async_trait]
impl Tool for SqlTool {
    fn name(&self) -> &str {
        "sql_query"
    }

    fn description(&self) -> &str {
        "Execute a SQL query against the configured PostgreSQL backend. SELECT-shaped \
         statements return an aligned text table; mutating statements report the \
         affected row count."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "SQL statement to execute"
                },
                "database": {
                    "type": "string",
                    "description": "Database name to connect to (default: postgres)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput> {
        let params: SqlInput = match serde_json::from_value(input) {
            Ok(params) => params,
            Err(error) => {
                return Ok(ToolOutput::error(
                    ToolErrorKind::InputInvalid,
                    format!("Invalid input: {error}"),
                ));
            }
        };
        let query = params.query.trim();
        if query.is_empty() {
            return Ok(ToolOutput::error(
                ToolErrorKind::InputInvalid,
                "Query must not be empty",
            ));
        }

        // Fail fast before any connection attempt.
        let credentials = match CredentialSet::resolve(self.secret_resolver.as_ref()) {
            Ok(credentials) => credentials,
            Err(missing) => {
                return Ok(classify::failure_output(BackendError::CredentialsMissing(
                    missing,
                )));
            }
        };
        let database = params
            .database
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        match self
            .backend
            .run(&credentials, &database, query, None)
            .await
        {
            Ok(reply) => Ok(ExecutionOutcome::from_query(&reply).into_output()),
            Err(error) => Ok(classify::failure_output(error)),
        }
    }
}
