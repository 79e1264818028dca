//! Per-invocation credential resolution for the query backend.

use std::fmt;

use thiserror::Error;

use opslens_traits::SecretResolver;

pub const HOST_KEY: &str = "PSQL_HOST";
pub const PORT_KEY: &str = "PSQL_PORT";
pub const USERNAME_KEY: &str = "PSQL_USERNAME";
pub const PASSWORD_KEY: &str = "PSQL_PASSWORD";

const DEFAULT_PORT: u16 = 5432;

/// Connection parameters that could not be resolved, reported by name.
/// Values never appear here.
#[derive(Debug, Clone, Error)]
#[error("Database credentials not configured. Missing: {}.", parameters.join(", "))]
pub struct MissingCredentials {
    pub parameters: Vec<&'static str>,
}

/// Resolved connection parameters for one invocation.
///
/// Resolved once per tool call and passed by value down the call chain;
/// backend clients never read credentials from ambient state.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialSet {
    pub host: String,
    pub port: u16,
    pub username: String,
    password: String,
}

impl CredentialSet {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Resolve from the framework's secret callback, falling back to the
    /// process environment for parameters the callback does not supply.
    pub fn resolve(resolver: Option<&SecretResolver>) -> Result<Self, MissingCredentials> {
        Self::resolve_with(|key| {
            resolver
                .and_then(|resolve| resolve(key))
                .or_else(|| std::env::var(key).ok())
        })
    }

    /// Resolve every parameter through one lookup function.
    ///
    /// Fails fast with the full list of unresolved parameter names so a
    /// single observation tells the operator everything that is missing.
    pub fn resolve_with(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, MissingCredentials> {
        let fetch = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = fetch(HOST_KEY);
        let username = fetch(USERNAME_KEY);
        let password = fetch(PASSWORD_KEY);

        let mut parameters = Vec::new();
        if host.is_none() {
            parameters.push(HOST_KEY);
        }
        if username.is_none() {
            parameters.push(USERNAME_KEY);
        }
        if password.is_none() {
            parameters.push(PASSWORD_KEY);
        }
        let (Some(host), Some(username), Some(password)) = (host, username, password) else {
            return Err(MissingCredentials { parameters });
        };

        let port = fetch(PORT_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            host,
            port,
            username,
            password,
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Cache key for the pool map. Covers every parameter, so two
    /// invocations with different credential sets never share a pool.
    pub(crate) fn pool_key(&self, database: &str) -> String {
        [
            self.host.as_str(),
            &self.port.to_string(),
            self.username.as_str(),
            self.password.as_str(),
            database,
        ]
        .join("\u{1}")
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
