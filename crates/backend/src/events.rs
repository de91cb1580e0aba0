//! Auth and change-feed event types.

use entities::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated session as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The signed-in user.
    pub user: User,
}

impl Session {
    /// Creates a session for the given user.
    pub fn new(user: User) -> Self {
        Self { user }
    }
}

/// Events delivered on the auth service's session-change stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A user signed in; carries the new session.
    SignedIn(Session),
    /// The current user signed out.
    SignedOut,
    /// The signed-in user's profile changed.
    UserUpdated(Session),
}

/// A row-level change delivered on a table's change feed.
///
/// Feeds are owner-scoped server-side, so every event a subscriber receives
/// concerns its own rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent<R> {
    /// A row was inserted.
    Inserted {
        /// The new row.
        new: R,
    },
    /// A row was updated.
    Updated {
        /// The row after the update.
        new: R,
    },
    /// A row was deleted.
    Deleted {
        /// Id of the removed row.
        id: Uuid,
        /// Owner of the removed row.
        owner_id: Uuid,
    },
}
