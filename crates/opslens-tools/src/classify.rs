//! Total classification of backend failures into the fixed taxonomy.

use opslens_traits::{ToolErrorKind, ToolOutput};

use crate::backend::BackendError;

/// Map one backend failure to its observation kind.
///
/// Classification is total: every `BackendError` variant lands on
/// exactly one kind, and anything unexpected lands on `Internal`.
pub fn kind_of(error: &BackendError) -> ToolErrorKind {
    match error {
        BackendError::CredentialsMissing(_) => ToolErrorKind::CredentialsMissing,
        BackendError::Connection(_) => ToolErrorKind::ConnectionFailed,
        BackendError::Timeout(_) => ToolErrorKind::Timeout,
        BackendError::Rejected(_) => ToolErrorKind::BackendRejected,
        BackendError::MalformedReply(_) | BackendError::Internal(_) => ToolErrorKind::Internal,
    }
}

/// Build the error-shaped observation for a failed invocation.
pub fn failure_output(error: BackendError) -> ToolOutput {
    let kind = kind_of(&error);
    let message = match kind {
        // Raw detail stays in the operator log, not the observation.
        ToolErrorKind::Internal => {
            tracing::warn!(error = %error, "unclassified backend failure");
            "The backend reported an unexpected error. Retry the request or contact an operator."
                .to_string()
        }
        _ => error.to_string(),
    };

    ToolOutput::error(kind, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MissingCredentials;
    use std::time::Duration;

    #[test]
    fn every_variant_maps_to_one_kind() {
        let cases = [
            (
                BackendError::CredentialsMissing(MissingCredentials {
                    parameters: vec!["PSQL_HOST"],
                }),
                ToolErrorKind::CredentialsMissing,
            ),
            (
                BackendError::Connection("refused".into()),
                ToolErrorKind::ConnectionFailed,
            ),
            (
                BackendError::Timeout(Duration::from_secs(30)),
                ToolErrorKind::Timeout,
            ),
            (
                BackendError::Rejected("relation does not exist".into()),
                ToolErrorKind::BackendRejected,
            ),
            (
                BackendError::MalformedReply("not json".into()),
                ToolErrorKind::Internal,
            ),
            (
                BackendError::Internal("worker crashed".into()),
                ToolErrorKind::Internal,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(kind_of(&error), expected);
        }
    }

    #[test]
    fn rejected_passes_through_backend_text() {
        let output = failure_output(BackendError::Rejected(
            "relation \"no_such_table\" does not exist".into(),
        ));
        assert!(!output.success);
        assert_eq!(output.error_kind, Some(ToolErrorKind::BackendRejected));
        assert!(output.error.unwrap().contains("does not exist"));
    }

    #[test]
    fn internal_failures_hide_raw_detail() {
        let output = failure_output(BackendError::Internal("stack trace at 0xdeadbeef".into()));
        assert_eq!(output.error_kind, Some(ToolErrorKind::Internal));
        assert!(!output.error.unwrap().contains("0xdeadbeef"));
    }

    #[test]
    fn transient_failures_are_marked_retryable() {
        let output = failure_output(BackendError::Timeout(Duration::from_secs(5)));
        assert_eq!(output.retryable, Some(true));

        let output = failure_output(BackendError::Rejected("syntax error".into()));
        assert_eq!(output.retryable, Some(false));
    }
}
