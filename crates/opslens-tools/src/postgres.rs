//! PostgreSQL query backend with per-credential connection pooling.

use std::time::Duration;

use dashmap::DashMap;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};

use crate::backend::BackendError;
use crate::credentials::CredentialSet;

const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
const MAX_POOL_CONNECTIONS: u32 = 5;

/// Statement prefixes expected to produce a row set.
const READ_PREFIXES: &[&str] = &["SELECT", "WITH", "SHOW", "EXPLAIN", "VALUES", "TABLE"];

/// Raw outcome of one query round-trip.
pub enum QueryReply {
    Rows(Vec<PgRow>),
    Affected(u64),
}

/// Query backend sharing lazily-created pools across invocations.
///
/// Pools are keyed by the full resolved credential set plus target
/// database; two invocations with different credentials never share a
/// connection. The pool map is the only state shared across
/// invocations.
pub struct QueryBackend {
    pools: DashMap<String, PgPool>,
    query_timeout: Duration,
}

impl Default for QueryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBackend {
    pub fn new() -> Self {
        Self {
            pools: DashMap::new(),
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    fn pool_for(&self, credentials: &CredentialSet, database: &str) -> PgPool {
        self.pools
            .entry(credentials.pool_key(database))
            .or_insert_with(|| {
                let options = PgConnectOptions::new()
                    .host(&credentials.host)
                    .port(credentials.port)
                    .username(&credentials.username)
                    .password(credentials.password())
                    .database(database);
                PgPoolOptions::new()
                    .max_connections(MAX_POOL_CONNECTIONS)
                    .acquire_timeout(self.query_timeout)
                    .connect_lazy_with(options)
            })
            .clone()
    }

    /// Run one statement on an exclusively-owned pooled connection.
    ///
    /// Read-shaped statements fetch the full row set; everything else
    /// executes and reports the affected-row count. A connection whose
    /// statement timed out is detached and closed, never handed back to
    /// the pool mid-query.
    pub async fn run(
        &self,
        credentials: &CredentialSet,
        database: &str,
        query: &str,
        timeout: Option<Duration>,
    ) -> Result<QueryReply, BackendError> {
        let timeout = timeout.unwrap_or(self.query_timeout);
        let pool = self.pool_for(credentials, database);
        let mut conn = pool.acquire().await.map_err(map_sqlx_error)?;

        if is_read_statement(query) {
            let fetched =
                tokio::time::timeout(timeout, sqlx::query(query).fetch_all(&mut *conn)).await;
            match fetched {
                Ok(Ok(rows)) => Ok(QueryReply::Rows(rows)),
                Ok(Err(error)) => Err(map_sqlx_error(error)),
                Err(_) => {
                    discard(conn, database);
                    Err(BackendError::Timeout(timeout))
                }
            }
        } else {
            let executed =
                tokio::time::timeout(timeout, sqlx::query(query).execute(&mut *conn)).await;
            match executed {
                Ok(Ok(done)) => Ok(QueryReply::Affected(done.rows_affected())),
                Ok(Err(error)) => Err(map_sqlx_error(error)),
                Err(_) => {
                    discard(conn, database);
                    Err(BackendError::Timeout(timeout))
                }
            }
        }
    }
}

/// Close a connection that may be wedged mid-query instead of returning
/// it to the pool.
fn discard(conn: sqlx::pool::PoolConnection<sqlx::Postgres>, database: &str) {
    tracing::warn!(database, "statement timed out; discarding connection");
    drop(conn.detach());
}

/// Whether a statement is expected to produce a row set.
pub fn is_read_statement(query: &str) -> bool {
    let upper = query.trim_start().to_uppercase();
    READ_PREFIXES.iter().any(|prefix| upper.starts_with(prefix))
}

pub(crate) fn map_sqlx_error(error: sqlx::Error) -> BackendError {
    match error {
        sqlx::Error::Database(db_error) => BackendError::Rejected(db_error.message().to_string()),
        sqlx::Error::Io(io_error) => BackendError::Connection(io_error.to_string()),
        sqlx::Error::Tls(tls_error) => BackendError::Connection(tls_error.to_string()),
        sqlx::Error::Configuration(config_error) => {
            BackendError::Connection(config_error.to_string())
        }
        sqlx::Error::PoolTimedOut => {
            BackendError::Connection("timed out acquiring a connection from the pool".into())
        }
        sqlx::Error::PoolClosed => BackendError::Connection("connection pool is closed".into()),
        sqlx::Error::Protocol(detail) => BackendError::MalformedReply(detail),
        sqlx::Error::ColumnDecode { index, source } => {
            BackendError::MalformedReply(format!("column {index}: {source}"))
        }
        other => BackendError::Internal(other.to_string()),
    }
}
