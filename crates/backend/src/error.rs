//! Backend error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No row with this id exists for the requesting owner. The backend does
    /// not distinguish "missing" from "not yours".
    #[error("{entity} not found: {id}")]
    RowNotFound { entity: &'static str, id: Uuid },

    /// Referential constraint violation.
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Sign-in rejected.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Sign-up rejected because the email is already registered.
    #[error("an account already exists for {0}")]
    EmailTaken(String),

    /// Filesystem error (local backend).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Creates a not-found error for an owner-scoped row lookup.
    pub fn row_not_found(entity: &'static str, id: Uuid) -> Self {
        Self::RowNotFound { entity, id }
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
