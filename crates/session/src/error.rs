//! Session error types.

use thiserror::Error;

/// Errors that can occur during session operations.
///
/// Restore and logout absorb backend failures internally, so credential
/// rejection is the only error callers see.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The auth service rejected the operation. Carries the service's
    /// message verbatim so the UI can show it.
    #[error("authentication failed: {0}")]
    Auth(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
