//! Environment-driven configuration for the backend clients.

use std::time::Duration;

const INTERPRETER_URL_ENV: &str = "OPSLENS_INTERPRETER_URL";
const INTERPRETER_TIMEOUT_ENV: &str = "OPSLENS_INTERPRETER_TIMEOUT_SECS";

const DEFAULT_INTERPRETER_URL: &str = "http://localhost:50082";
const DEFAULT_INTERPRETER_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the code-interpreter service.
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Base URL of the interpreter service, without a trailing slash.
    pub base_url: String,
    /// Default per-request timeout. Callers may override per invocation.
    pub timeout: Duration,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl InterpreterConfig {
    /// Create a config pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_INTERPRETER_TIMEOUT_SECS),
        }
    }

    /// Read the config from process environment, falling back to the
    /// local development defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(INTERPRETER_URL_ENV).unwrap_or_else(|_| DEFAULT_INTERPRETER_URL.into());
        let timeout = std::env::var(INTERPRETER_TIMEOUT_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_INTERPRETER_TIMEOUT_SECS);

        Self::new(base_url).with_timeout(Duration::from_secs(timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
