//! Caller-facing error taxonomy.
//!
//! Every variant except [`PulsarDbError::Repository`] describes a problem with
//! the caller's input and is reported synchronously, never retried.

use crate::db::repository::RepositoryError;
use crate::models::EntityKind;

/// Result type for collection, query and normalizer operations.
pub type PulsarDbResult<T> = Result<T, PulsarDbError>;

/// Errors surfaced by the query engine and the collection façade.
#[derive(Debug, thiserror::Error)]
pub enum PulsarDbError {
    /// Malformed or missing input (unparseable time, non-positive frequency,
    /// missing required field, alias collision, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unrecognized query parameter or sort key.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing or rejected API key on a mutating call.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A post referenced a pulsar or telescope that does not resolve.
    #[error("Reference error: {entity} '{name}' does not resolve to an existing entry")]
    Reference { entity: EntityKind, name: String },

    /// Failure reported by the storage collaborator.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl PulsarDbError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    pub fn reference(entity: EntityKind, name: impl Into<String>) -> Self {
        Self::Reference {
            entity,
            name: name.into(),
        }
    }

    /// Short machine-readable code, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::Authentication(_) => "AUTHENTICATION_ERROR",
            Self::Reference { .. } => "REFERENCE_ERROR",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }
}

impl From<RepositoryError> for PulsarDbError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // Uniqueness violations and store-side validation are caller input problems.
            RepositoryError::Conflict { message, .. }
            | RepositoryError::ValidationError { message, .. } => Self::Validation(message),
            other => Self::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::ErrorContext;

    #[test]
    fn test_conflict_maps_to_validation() {
        let err: PulsarDbError = RepositoryError::conflict_with_context(
            "alias 'B0329+54' already taken",
            ErrorContext::new("add_alias"),
        )
        .into();
        assert!(matches!(err, PulsarDbError::Validation(ref m) if m.contains("B0329+54")));
    }

    #[test]
    fn test_unavailable_store_stays_repository() {
        let err: PulsarDbError = RepositoryError::unavailable("store offline").into();
        assert!(matches!(err, PulsarDbError::Repository(_)));
        assert_eq!(err.code(), "REPOSITORY_ERROR");
    }

    #[test]
    fn test_reference_display() {
        let err = PulsarDbError::reference(EntityKind::Telescope, "Parkes");
        assert_eq!(
            err.to_string(),
            "Reference error: telescope 'Parkes' does not resolve to an existing entry"
        );
    }
}
