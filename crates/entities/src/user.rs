//! User entity definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A read-only projection of the identity held by the auth service.
///
/// The client never creates or mutates accounts directly; this struct is
/// populated from session payloads and dropped on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier issued by the auth service.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
}

impl User {
    /// Creates a new user projection.
    pub fn new(id: Uuid, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
        }
    }
}
