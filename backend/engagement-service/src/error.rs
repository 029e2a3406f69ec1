/// Error types for the engagement service
use resilience::DeadlineExceeded;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Result type alias for engagement operations
pub type EngagementResult<T> = Result<T, EngagementError>;

#[derive(Debug, Error)]
pub enum EngagementError {
    /// Malformed or missing required input; names the offending field
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// An edge operation where source == target
    #[error("source and target of a relationship must differ")]
    SelfReference,

    /// The follow/like edge already exists
    #[error("{0} already exists")]
    DuplicateEdge(&'static str),

    /// A referenced entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// The caller may not mutate the target entity
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The operation deadline elapsed before the store call completed
    #[error("operation deadline elapsed")]
    Timeout,

    /// Underlying storage failure; opaque to callers, logged at the boundary
    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),
}

impl EngagementError {
    /// Stable discriminator for the route layer's structured responses.
    pub fn kind(&self) -> &'static str {
        match self {
            EngagementError::Validation { .. } => "validation",
            EngagementError::SelfReference => "self_reference",
            EngagementError::DuplicateEdge(_) => "duplicate_edge",
            EngagementError::NotFound(_) => "not_found",
            EngagementError::Forbidden(_) => "forbidden",
            EngagementError::Timeout => "timeout",
            EngagementError::Store(_) => "store",
        }
    }

    /// Domain errors are recoverable caller mistakes; `Store`/`Timeout` are
    /// system failures and must not be retried blindly.
    pub fn is_domain(&self) -> bool {
        !matches!(
            self,
            EngagementError::Store(_) | EngagementError::Timeout
        )
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngagementError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Translate constraint violations raised by an edge or content insert
    /// into their domain meaning. The unique-constraint case is exactly the
    /// concurrent duplicate attempt losing the race; the FK case is a
    /// reference to an entity that does not exist.
    pub(crate) fn from_insert(err: sqlx::Error, edge: &'static str, referenced: &str) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.kind() {
                ErrorKind::UniqueViolation => return EngagementError::DuplicateEdge(edge),
                ErrorKind::ForeignKeyViolation => {
                    return EngagementError::NotFound(referenced.to_string())
                }
                _ => {}
            }
        }
        EngagementError::Store(err)
    }
}

impl From<DeadlineExceeded> for EngagementError {
    fn from(_: DeadlineExceeded) -> Self {
        EngagementError::Timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(
            EngagementError::validation("body", "must not be empty").kind(),
            "validation"
        );
        assert_eq!(EngagementError::SelfReference.kind(), "self_reference");
        assert_eq!(EngagementError::DuplicateEdge("follow").kind(), "duplicate_edge");
        assert_eq!(EngagementError::NotFound("post".into()).kind(), "not_found");
        assert_eq!(EngagementError::Forbidden("nope".into()).kind(), "forbidden");
        assert_eq!(EngagementError::Timeout.kind(), "timeout");
        assert_eq!(
            EngagementError::Store(sqlx::Error::RowNotFound).kind(),
            "store"
        );
    }

    #[test]
    fn store_and_timeout_are_not_domain_errors() {
        assert!(EngagementError::DuplicateEdge("like").is_domain());
        assert!(EngagementError::SelfReference.is_domain());
        assert!(!EngagementError::Store(sqlx::Error::RowNotFound).is_domain());
        assert!(!EngagementError::Timeout.is_domain());
    }

    #[test]
    fn non_constraint_errors_stay_opaque() {
        let err = EngagementError::from_insert(sqlx::Error::RowNotFound, "follow", "user");
        assert!(matches!(err, EngagementError::Store(_)));
    }

    #[test]
    fn validation_names_the_field() {
        let err = EngagementError::validation("description", "post needs content");
        assert_eq!(err.to_string(), "invalid description: post needs content");
    }
}
