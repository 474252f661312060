//! Shared mapping from [`RestError`] into repository port errors.

use tracing::debug;

use super::client::RestError;
use crate::domain::ports::{
    BottleRepositoryError, CatalogueRepositoryError, ImportRepositoryError, VisitRepositoryError,
};

/// Port errors that can be built from a failed store request.
pub(super) trait FromRestError: Sized {
    fn from_transport(message: String) -> Self;
    fn from_timeout(message: String) -> Self;
    fn from_query(message: String) -> Self;

    /// Unique-constraint rejections. Ports without a dedicated variant report
    /// them as query failures.
    fn from_conflict(message: String) -> Self {
        Self::from_query(message)
    }
}

/// Map a store failure into the port error `E`.
pub(super) fn map_rest_error<E: FromRestError>(error: RestError) -> E {
    debug!(%error, "store request failed");
    match error {
        RestError::Transport { message } => E::from_transport(message),
        RestError::Timeout { message } => E::from_timeout(message),
        conflict if conflict.is_unique_violation() => E::from_conflict(conflict.to_string()),
        other => E::from_query(other.to_string()),
    }
}

macro_rules! impl_from_rest_error {
    ($error:ty) => {
        impl FromRestError for $error {
            fn from_transport(message: String) -> Self {
                <$error>::connection(message)
            }

            fn from_timeout(message: String) -> Self {
                <$error>::timeout(message)
            }

            fn from_query(message: String) -> Self {
                <$error>::query(message)
            }
        }
    };
}

impl_from_rest_error!(BottleRepositoryError);
impl_from_rest_error!(CatalogueRepositoryError);
impl_from_rest_error!(ImportRepositoryError);

impl FromRestError for VisitRepositoryError {
    fn from_transport(message: String) -> Self {
        Self::connection(message)
    }

    fn from_timeout(message: String) -> Self {
        Self::timeout(message)
    }

    fn from_query(message: String) -> Self {
        Self::query(message)
    }

    fn from_conflict(message: String) -> Self {
        Self::conflict(message)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for store error classification.

    use super::*;
    use rstest::rstest;

    fn status(status: u16, code: Option<&str>) -> RestError {
        RestError::Status {
            status,
            code: code.map(str::to_owned),
            message: "rejected".to_owned(),
        }
    }

    #[rstest]
    #[case::transport(RestError::Transport { message: "reset".to_owned() }, "Connection")]
    #[case::timeout(RestError::Timeout { message: "elapsed".to_owned() }, "Timeout")]
    #[case::unique(status(409, Some("23505")), "Conflict")]
    #[case::foreign_key(status(409, Some("23503")), "Query")]
    #[case::forbidden(status(403, Some("42501")), "Query")]
    #[case::decode(RestError::Decode { message: "eof".to_owned() }, "Query")]
    fn visit_errors_keep_conflicts_distinct(#[case] error: RestError, #[case] expected: &str) {
        let mapped: VisitRepositoryError = map_rest_error(error);
        let variant = match mapped {
            VisitRepositoryError::Connection { .. } => "Connection",
            VisitRepositoryError::Timeout { .. } => "Timeout",
            VisitRepositoryError::Query { .. } => "Query",
            VisitRepositoryError::Conflict { .. } => "Conflict",
            VisitRepositoryError::NotFound { .. } => "NotFound",
        };
        assert_eq!(variant, expected);
    }

    #[test]
    fn other_ports_report_conflicts_as_query_errors() {
        let mapped: BottleRepositoryError = map_rest_error(status(409, Some("23505")));
        assert!(matches!(mapped, BottleRepositoryError::Query { .. }));
    }
}
