//! Store error types.

use backend::BackendError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during store operations.
///
/// Nothing here is fatal: every failure degrades to an error message plus
/// unchanged local state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Rejected client-side before any backend call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backend reported no matching row for this user. Missing and
    /// foreign rows are indistinguishable by design.
    #[error("{entity} not found or not yours: {id}")]
    NotFoundOrForbidden { entity: &'static str, id: Uuid },

    /// No user is signed in.
    #[error("no authenticated user")]
    NoSession,

    /// Any failed backend table operation.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StoreError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn from_backend(e: BackendError) -> Self {
        match e {
            BackendError::RowNotFound { entity, id } => {
                Self::NotFoundOrForbidden { entity, id }
            }
            other => Self::Backend(other),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
