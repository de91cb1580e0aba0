//! Backend trait definitions.

use async_trait::async_trait;
use entities::{CategoryDraft, CategoryPatch, CategoryRow, TaskDraft, TaskPatch, TaskRow};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{AuthEvent, BackendResult, ChangeEvent, Session};

/// The external auth service the session store delegates to.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Returns the current session, if one exists.
    async fn session(&self) -> BackendResult<Option<Session>>;

    /// Signs in with email and password.
    ///
    /// On success the backend also emits [`AuthEvent::SignedIn`] on the
    /// session-change stream; callers are expected to react to the event,
    /// not the return value.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session>;

    /// Creates an account, attaching `name` as profile metadata, and signs
    /// the new user in.
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> BackendResult<Session>;

    /// Ends the current session and emits [`AuthEvent::SignedOut`].
    async fn sign_out(&self) -> BackendResult<()>;

    /// Subscribes to the session-change stream.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// The owner-scoped row store holding the `tasks` and `categories` tables.
///
/// Every read and write is scoped by owner id; a backend never returns or
/// touches another user's rows. Mutations emit change events on the
/// corresponding table feed after the write is committed.
#[async_trait]
pub trait TableBackend: Send + Sync {
    // =========================================================================
    // Task operations
    // =========================================================================

    /// Lists all tasks owned by the user, in insertion order.
    async fn list_tasks(&self, owner_id: Uuid) -> BackendResult<Vec<TaskRow>>;

    /// Inserts a task, assigning its id and creation timestamp.
    async fn insert_task(&self, owner_id: Uuid, draft: TaskDraft) -> BackendResult<TaskRow>;

    /// Applies a sparse patch to an owned task.
    async fn update_task(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: TaskPatch,
    ) -> BackendResult<TaskRow>;

    /// Deletes an owned task. Returns the number of rows removed; deleting a
    /// row that is already gone is a success returning 0.
    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> BackendResult<u64>;

    /// Deletes every owned task filed under the given category. Returns the
    /// number of rows removed.
    async fn delete_tasks_in_category(
        &self,
        category_id: Uuid,
        owner_id: Uuid,
    ) -> BackendResult<u64>;

    // =========================================================================
    // Category operations
    // =========================================================================

    /// Lists all categories owned by the user, in insertion order.
    async fn list_categories(&self, owner_id: Uuid) -> BackendResult<Vec<CategoryRow>>;

    /// Inserts a category, assigning its id.
    async fn insert_category(
        &self,
        owner_id: Uuid,
        draft: CategoryDraft,
    ) -> BackendResult<CategoryRow>;

    /// Applies a sparse patch to an owned category.
    async fn update_category(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: CategoryPatch,
    ) -> BackendResult<CategoryRow>;

    /// Deletes an owned category. Returns the number of rows removed.
    async fn delete_category(&self, id: Uuid, owner_id: Uuid) -> BackendResult<u64>;

    // =========================================================================
    // Change feeds
    // =========================================================================

    /// Subscribes to changes on the user's tasks.
    fn subscribe_tasks(&self, owner_id: Uuid) -> broadcast::Receiver<ChangeEvent<TaskRow>>;

    /// Subscribes to changes on the user's categories.
    fn subscribe_categories(&self, owner_id: Uuid)
        -> broadcast::Receiver<ChangeEvent<CategoryRow>>;
}
