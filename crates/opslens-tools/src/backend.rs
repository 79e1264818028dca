//! Tagged failure conditions surfaced by the backend clients.

use std::time::Duration;

use thiserror::Error;

use crate::credentials::MissingCredentials;

/// One distinct variant per failure path out of a backend round-trip.
///
/// Clients return these instead of raising transport errors past the
/// adapter boundary; the classifier maps each variant to exactly one
/// observation kind.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Required connection parameters were not resolved. Detected before
    /// any connection attempt.
    #[error("{0}")]
    CredentialsMissing(#[from] MissingCredentials),

    /// Transport-level failure reaching the backend.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The backend call did not complete within the allotted time.
    #[error("Backend call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The backend was reached but reported a domain error (SQL error,
    /// execution rejection, permission denial). The message is the
    /// backend's own text.
    #[error("{0}")]
    Rejected(String),

    /// The backend replied with something this client cannot decode.
    #[error("Malformed backend reply: {0}")]
    MalformedReply(String),

    /// Anything not otherwise tagged.
    #[error("Unexpected backend failure: {0}")]
    Internal(String),
}
