//! The reconciling entity store.

use std::sync::{Arc, Mutex, RwLock};

use backend::{ChangeEvent, TableBackend};
use entities::{
    Category, CategoryDraft, CategoryPatch, CategoryRow, Task, TaskDraft, TaskPatch, TaskRow, User,
};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use uuid::Uuid;

use crate::{StoreError, StoreResult};

/// Categories seeded for a user who has none yet.
pub const DEFAULT_CATEGORIES: [(&str, &str); 3] = [
    ("Personal", "#6366F1"),
    ("Work", "#F59E0B"),
    ("Health", "#10B981"),
];

#[derive(Debug, Default)]
struct Inner {
    /// Bumped on every (re)initialization. Feed consumers spawned for an
    /// older generation stop applying events once they observe a newer one,
    /// which guards against a stale subscription mutating a fresh session's
    /// collections.
    generation: u64,
    owner_id: Option<Uuid>,
    tasks: Vec<Task>,
    categories: Vec<Category>,
    loading: bool,
    last_error: Option<String>,
}

impl Inner {
    fn apply_task_event(&mut self, event: ChangeEvent<TaskRow>) {
        match event {
            ChangeEvent::Inserted { new } => self.tasks.push(Task::from(new)),
            ChangeEvent::Updated { new } => {
                let task = Task::from(new);
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task;
                }
            }
            ChangeEvent::Deleted { id, .. } => self.tasks.retain(|t| t.id != id),
        }
    }

    fn apply_category_event(&mut self, event: ChangeEvent<CategoryRow>) {
        match event {
            ChangeEvent::Inserted { new } => self.categories.push(Category::from(new)),
            ChangeEvent::Updated { new } => {
                let category = Category::from(new);
                if let Some(slot) = self.categories.iter_mut().find(|c| c.id == category.id) {
                    *slot = category;
                }
            }
            ChangeEvent::Deleted { id, .. } => self.categories.retain(|c| c.id != id),
        }
    }

    fn reset_for(&mut self, owner_id: Option<Uuid>) -> u64 {
        self.generation += 1;
        self.owner_id = owner_id;
        self.tasks.clear();
        self.categories.clear();
        self.loading = owner_id.is_some();
        self.last_error = None;
        self.generation
    }
}

/// Owns the canonical in-memory task and category collections for the
/// current user.
///
/// Mutations never touch the collections directly; the backend's change
/// feeds are the only writer of the read model. A just-submitted create is
/// therefore invisible until its echo arrives.
pub struct TaskStore {
    backend: Arc<dyn TableBackend>,
    inner: Arc<RwLock<Inner>>,
    feeds: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskStore {
    /// Creates a store with empty collections and no session.
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self {
            backend,
            inner: Arc::new(RwLock::new(Inner::default())),
            feeds: Mutex::new(Vec::new()),
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Runs the initialization protocol for a session change.
    ///
    /// Anonymous clears everything without touching the backend. For an
    /// authenticated user: fetch categories, seed the default set when the
    /// user has none, fetch tasks, then open the two change-feed
    /// subscriptions. Old subscriptions are always closed first so events
    /// can never cross users.
    pub async fn initialize(&self, user: Option<User>) -> StoreResult<()> {
        self.teardown_feeds();

        let owner_id = user.map(|u| u.id);
        let generation = self.inner.write().unwrap().reset_for(owner_id);

        let Some(owner_id) = owner_id else {
            return Ok(());
        };

        match self.load_initial(owner_id).await {
            Ok((categories, tasks)) => {
                {
                    let mut inner = self.inner.write().unwrap();
                    if inner.generation != generation {
                        // Superseded by a newer session change.
                        return Ok(());
                    }
                    inner.categories = categories;
                    inner.tasks = tasks;
                    inner.loading = false;
                }
                self.spawn_feeds(owner_id, generation);
                tracing::debug!(%owner_id, "store initialized");
                Ok(())
            }
            Err(e) => {
                let mut inner = self.inner.write().unwrap();
                if inner.generation == generation {
                    inner.tasks.clear();
                    inner.categories.clear();
                    inner.loading = false;
                    inner.last_error = Some(e.to_string());
                }
                drop(inner);
                tracing::error!(%owner_id, error = %e, "initial load failed");
                Err(e)
            }
        }
    }

    /// Closes the change-feed subscriptions. Called automatically on
    /// re-initialization; call explicitly on shutdown.
    pub fn shutdown(&self) {
        self.teardown_feeds();
    }

    async fn load_initial(&self, owner_id: Uuid) -> StoreResult<(Vec<Category>, Vec<Task>)> {
        let mut rows = self.backend.list_categories(owner_id).await?;

        if rows.is_empty() {
            tracing::info!(%owner_id, "seeding default categories for new user");
            for (name, color) in DEFAULT_CATEGORIES {
                let row = self
                    .backend
                    .insert_category(owner_id, CategoryDraft::new(name, color))
                    .await?;
                rows.push(row);
            }
        }

        let categories = rows.into_iter().map(Category::from).collect();
        let tasks = self
            .backend
            .list_tasks(owner_id)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();

        Ok((categories, tasks))
    }

    fn spawn_feeds(&self, owner_id: Uuid, generation: u64) {
        let mut task_rx = self.backend.subscribe_tasks(owner_id);
        let task_inner = Arc::clone(&self.inner);
        let task_handle = tokio::spawn(async move {
            loop {
                match task_rx.recv().await {
                    Ok(event) => {
                        let mut inner = task_inner.write().unwrap();
                        if inner.generation != generation {
                            break;
                        }
                        inner.apply_task_event(event);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "task feed lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut category_rx = self.backend.subscribe_categories(owner_id);
        let category_inner = Arc::clone(&self.inner);
        let category_handle = tokio::spawn(async move {
            loop {
                match category_rx.recv().await {
                    Ok(event) => {
                        let mut inner = category_inner.write().unwrap();
                        if inner.generation != generation {
                            break;
                        }
                        inner.apply_category_event(event);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "category feed lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut feeds = self.feeds.lock().unwrap();
        feeds.push(task_handle);
        feeds.push(category_handle);
    }

    fn teardown_feeds(&self) {
        let mut feeds = self.feeds.lock().unwrap();
        for handle in feeds.drain(..) {
            handle.abort();
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the current task collection, in reconciled order.
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.read().unwrap().tasks.clone()
    }

    /// Snapshot of the current category collection, in reconciled order.
    pub fn categories(&self) -> Vec<Category> {
        self.inner.read().unwrap().categories.clone()
    }

    /// Tasks filed under the given category, order preserving. Pure
    /// in-memory filter; no backend call.
    pub fn tasks_by_category(&self, category_id: Uuid) -> Vec<Task> {
        self.inner
            .read()
            .unwrap()
            .tasks
            .iter()
            .filter(|t| t.category_id == category_id)
            .cloned()
            .collect()
    }

    /// True while the initial fetch for the current user is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.read().unwrap().loading
    }

    /// The most recent backend failure, if any. Cleared on
    /// re-initialization.
    pub fn last_error(&self) -> Option<String> {
        self.inner.read().unwrap().last_error.clone()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a task. The new task appears in [`tasks`](Self::tasks) only
    /// once the backend echoes the insert on the change feed.
    pub async fn create_task(&self, draft: TaskDraft) -> StoreResult<()> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::validation("task title must not be empty"));
        }
        let owner_id = self.owner_id()?;
        {
            let inner = self.inner.read().unwrap();
            if !inner.categories.iter().any(|c| c.id == draft.category_id) {
                return Err(StoreError::validation(format!(
                    "unknown category: {}",
                    draft.category_id
                )));
            }
        }

        self.backend
            .insert_task(owner_id, draft)
            .await
            .map(|_| ())
            .map_err(|e| self.fail(StoreError::from_backend(e)))
    }

    /// Applies a sparse patch to an owned task.
    pub async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<()> {
        let owner_id = self.owner_id()?;
        self.backend
            .update_task(id, owner_id, patch)
            .await
            .map(|_| ())
            .map_err(|e| self.fail(StoreError::from_backend(e)))
    }

    /// Deletes a task. Deleting an id that is already gone is a success
    /// no-op.
    pub async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        let owner_id = self.owner_id()?;
        self.backend
            .delete_task(id, owner_id)
            .await
            .map(|_| ())
            .map_err(|e| self.fail(StoreError::from_backend(e)))
    }

    /// Creates a category.
    pub async fn create_category(&self, draft: CategoryDraft) -> StoreResult<()> {
        if draft.name.trim().is_empty() {
            return Err(StoreError::validation("category name must not be empty"));
        }
        let owner_id = self.owner_id()?;
        self.backend
            .insert_category(owner_id, draft)
            .await
            .map(|_| ())
            .map_err(|e| self.fail(StoreError::from_backend(e)))
    }

    /// Applies a sparse patch to an owned category.
    pub async fn update_category(&self, id: Uuid, patch: CategoryPatch) -> StoreResult<()> {
        let owner_id = self.owner_id()?;
        self.backend
            .update_category(id, owner_id, patch)
            .await
            .map(|_| ())
            .map_err(|e| self.fail(StoreError::from_backend(e)))
    }

    /// Deletes a category and every task filed under it.
    ///
    /// Two-phase: tasks go first, and the category row is only touched after
    /// the task phase succeeds. A task-phase failure must leave the category
    /// in place so no task ever points at a dangling id.
    pub async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let owner_id = self.owner_id()?;

        self.backend
            .delete_tasks_in_category(id, owner_id)
            .await
            .map_err(|e| self.fail(StoreError::from_backend(e)))?;

        self.backend
            .delete_category(id, owner_id)
            .await
            .map(|_| ())
            .map_err(|e| self.fail(StoreError::from_backend(e)))
    }

    fn owner_id(&self) -> StoreResult<Uuid> {
        self.inner
            .read()
            .unwrap()
            .owner_id
            .ok_or(StoreError::NoSession)
    }

    /// Records a backend-class failure on the user-visible error channel and
    /// hands it back so the caller can keep its editing state open.
    fn fail(&self, err: StoreError) -> StoreError {
        tracing::error!(error = %err, "store operation failed");
        self.inner.write().unwrap().last_error = Some(err.to_string());
        err
    }
}

/// Consumer loop tying the store to the session: re-initializes whenever the
/// authenticated user changes, including to anonymous.
pub fn spawn_session_sync(
    store: Arc<TaskStore>,
    mut user_rx: watch::Receiver<Option<User>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let user = user_rx.borrow_and_update().clone();
            if let Err(e) = store.initialize(user).await {
                tracing::error!(error = %e, "store initialization failed");
            }
            if user_rx.changed().await.is_err() {
                store.shutdown();
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use backend::{AuthBackend, BackendError, BackendResult, MemoryBackend};
    use entities::TaskRow;

    use super::*;

    fn sample_row(owner_id: Uuid, category_id: Uuid, title: &str) -> TaskRow {
        TaskRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            completed: false,
            created_at: chrono::Utc::now(),
            category_id,
            owner_id,
        }
    }

    async fn eventually(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    async fn initialized_store() -> (Arc<MemoryBackend>, TaskStore, User) {
        let backend = Arc::new(MemoryBackend::new());
        let user = backend
            .sign_up("test@example.com", "hunter2", "Test User")
            .await
            .unwrap()
            .user;
        let store = TaskStore::new(backend.clone());
        store.initialize(Some(user.clone())).await.unwrap();
        (backend, store, user)
    }

    #[test]
    fn test_update_event_is_idempotent() {
        let owner = Uuid::new_v4();
        let category = Uuid::new_v4();
        let mut inner = Inner::default();

        let row = sample_row(owner, category, "original");
        inner.apply_task_event(ChangeEvent::Inserted { new: row.clone() });

        let mut updated = row.clone();
        updated.title = "renamed".to_string();
        inner.apply_task_event(ChangeEvent::Updated {
            new: updated.clone(),
        });
        let after_once = inner.tasks.clone();

        inner.apply_task_event(ChangeEvent::Updated { new: updated });
        assert_eq!(inner.tasks, after_once);
        assert_eq!(inner.tasks[0].title, "renamed");
    }

    #[test]
    fn test_update_event_preserves_order() {
        let owner = Uuid::new_v4();
        let category = Uuid::new_v4();
        let mut inner = Inner::default();

        let first = sample_row(owner, category, "first");
        let second = sample_row(owner, category, "second");
        let third = sample_row(owner, category, "third");
        for row in [&first, &second, &third] {
            inner.apply_task_event(ChangeEvent::Inserted { new: row.clone() });
        }

        let mut renamed = second.clone();
        renamed.title = "second, renamed".to_string();
        inner.apply_task_event(ChangeEvent::Updated { new: renamed });

        let titles: Vec<&str> = inner.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["first", "second, renamed", "third"]);
    }

    #[test]
    fn test_delete_event_removes_matching_id() {
        let owner = Uuid::new_v4();
        let category = Uuid::new_v4();
        let mut inner = Inner::default();

        let row = sample_row(owner, category, "doomed");
        inner.apply_task_event(ChangeEvent::Inserted { new: row.clone() });
        inner.apply_task_event(ChangeEvent::Deleted {
            id: row.id,
            owner_id: owner,
        });

        assert!(inner.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_new_user_gets_default_categories() {
        let (_backend, store, _user) = initialized_store().await;

        let categories = store.categories();
        assert_eq!(categories.len(), 3);
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Personal", "Work", "Health"]);
        for category in &categories {
            assert!(!category.id.is_nil());
        }
    }

    #[tokio::test]
    async fn test_existing_categories_are_not_reseeded() {
        let (backend, store, user) = initialized_store().await;
        assert_eq!(store.categories().len(), 3);

        // Re-initialize for the same user: still 3, not 6.
        store.initialize(Some(user)).await.unwrap();
        assert_eq!(store.categories().len(), 3);
        let owner_id = store.owner_id().unwrap();
        assert_eq!(backend.list_categories(owner_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_anonymous_initialize_clears_without_backend_calls() {
        let (backend, store, _user) = initialized_store().await;
        let calls_before = backend.table_calls();

        store.initialize(None).await.unwrap();

        assert!(store.tasks().is_empty());
        assert!(store.categories().is_empty());
        assert!(!store.is_loading());
        assert_eq!(backend.table_calls(), calls_before);
    }

    #[tokio::test]
    async fn test_create_task_appears_via_feed_echo() {
        let (_backend, store, _user) = initialized_store().await;
        let category_id = store.categories()[0].id;

        store
            .create_task(TaskDraft::new("Buy milk", category_id))
            .await
            .unwrap();

        let probe = store.inner.clone();
        eventually(move || probe.read().unwrap().tasks.len() == 1).await;
        assert_eq!(store.tasks()[0].title, "Buy milk");
    }

    #[tokio::test]
    async fn test_empty_title_fails_validation_without_backend_call() {
        let (backend, store, _user) = initialized_store().await;
        let category_id = store.categories()[0].id;
        let calls_before = backend.table_calls();

        let err = store
            .create_task(TaskDraft::new("", category_id))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(backend.table_calls(), calls_before);
    }

    #[tokio::test]
    async fn test_unknown_category_fails_validation() {
        let (backend, store, _user) = initialized_store().await;
        let calls_before = backend.table_calls();

        let err = store
            .create_task(TaskDraft::new("Orphan", Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(backend.table_calls(), calls_before);
    }

    #[tokio::test]
    async fn test_sparse_patch_through_echo() {
        let (_backend, store, _user) = initialized_store().await;
        let category_id = store.categories()[0].id;

        store
            .create_task(
                TaskDraft::new("Write report", category_id).with_description("Quarterly numbers"),
            )
            .await
            .unwrap();
        let probe = store.inner.clone();
        eventually(move || probe.read().unwrap().tasks.len() == 1).await;
        let task = store.tasks()[0].clone();

        store
            .update_task(task.id, TaskPatch::new().with_completed(true))
            .await
            .unwrap();
        let probe = store.inner.clone();
        eventually(move || probe.read().unwrap().tasks[0].completed).await;

        let updated = store.tasks()[0].clone();
        assert_eq!(updated.title, "Write report");
        assert_eq!(updated.description.as_deref(), Some("Quarterly numbers"));
        assert_eq!(updated.category_id, category_id);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn test_delete_category_cascades_to_tasks() {
        let (_backend, store, _user) = initialized_store().await;
        let doomed = store.categories()[0].id;
        let kept = store.categories()[1].id;

        store
            .create_task(TaskDraft::new("goes away", doomed))
            .await
            .unwrap();
        store
            .create_task(TaskDraft::new("stays", kept))
            .await
            .unwrap();
        let probe = store.inner.clone();
        eventually(move || probe.read().unwrap().tasks.len() == 2).await;

        store.delete_category(doomed).await.unwrap();

        let probe = store.inner.clone();
        eventually(move || probe.read().unwrap().categories.len() == 2).await;
        let probe = store.inner.clone();
        eventually(move || probe.read().unwrap().tasks.len() == 1).await;

        assert!(store.tasks_by_category(doomed).is_empty());
        assert_eq!(store.tasks()[0].title, "stays");
    }

    /// Table backend whose task-cascade delete always fails.
    struct RefusingCascade {
        inner: Arc<MemoryBackend>,
    }

    #[async_trait::async_trait]
    impl TableBackend for RefusingCascade {
        async fn list_tasks(&self, owner_id: Uuid) -> BackendResult<Vec<TaskRow>> {
            self.inner.list_tasks(owner_id).await
        }

        async fn insert_task(&self, owner_id: Uuid, draft: TaskDraft) -> BackendResult<TaskRow> {
            self.inner.insert_task(owner_id, draft).await
        }

        async fn update_task(
            &self,
            id: Uuid,
            owner_id: Uuid,
            patch: TaskPatch,
        ) -> BackendResult<TaskRow> {
            self.inner.update_task(id, owner_id, patch).await
        }

        async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> BackendResult<u64> {
            self.inner.delete_task(id, owner_id).await
        }

        async fn delete_tasks_in_category(
            &self,
            _category_id: Uuid,
            _owner_id: Uuid,
        ) -> BackendResult<u64> {
            Err(BackendError::Other("cascade unavailable".to_string()))
        }

        async fn list_categories(&self, owner_id: Uuid) -> BackendResult<Vec<CategoryRow>> {
            self.inner.list_categories(owner_id).await
        }

        async fn insert_category(
            &self,
            owner_id: Uuid,
            draft: CategoryDraft,
        ) -> BackendResult<CategoryRow> {
            self.inner.insert_category(owner_id, draft).await
        }

        async fn update_category(
            &self,
            id: Uuid,
            owner_id: Uuid,
            patch: CategoryPatch,
        ) -> BackendResult<CategoryRow> {
            self.inner.update_category(id, owner_id, patch).await
        }

        async fn delete_category(&self, id: Uuid, owner_id: Uuid) -> BackendResult<u64> {
            self.inner.delete_category(id, owner_id).await
        }

        fn subscribe_tasks(&self, owner_id: Uuid) -> broadcast::Receiver<ChangeEvent<TaskRow>> {
            self.inner.subscribe_tasks(owner_id)
        }

        fn subscribe_categories(
            &self,
            owner_id: Uuid,
        ) -> broadcast::Receiver<ChangeEvent<CategoryRow>> {
            self.inner.subscribe_categories(owner_id)
        }
    }

    #[tokio::test]
    async fn test_category_survives_failed_task_cascade() {
        let backend = Arc::new(MemoryBackend::new());
        let user = backend
            .sign_up("test@example.com", "hunter2", "Test User")
            .await
            .unwrap()
            .user;
        let store = TaskStore::new(Arc::new(RefusingCascade {
            inner: Arc::clone(&backend),
        }));
        store.initialize(Some(user.clone())).await.unwrap();
        let doomed = store.categories()[0].id;

        let err = store.delete_category(doomed).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(store.last_error().is_some());

        // The task phase failed, so the category phase never ran.
        let categories = backend.list_categories(user.id).await.unwrap();
        assert!(categories.iter().any(|c| c.id == doomed));
        assert!(store.categories().iter().any(|c| c.id == doomed));
    }

    #[tokio::test]
    async fn test_delete_task_is_idempotent_for_callers() {
        let (_backend, store, _user) = initialized_store().await;

        // Never existed; still a success no-op.
        store.delete_task(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_foreign_task_is_not_found_or_forbidden() {
        let (backend, store, _user) = initialized_store().await;

        let other = backend
            .sign_up("other@example.com", "pw", "Other")
            .await
            .unwrap()
            .user;
        let other_category = backend
            .insert_category(other.id, CategoryDraft::new("Theirs", "#000000"))
            .await
            .unwrap();
        let other_task = backend
            .insert_task(other.id, TaskDraft::new("not yours", other_category.id))
            .await
            .unwrap();

        let err = store
            .update_task(other_task.id, TaskPatch::new().with_completed(true))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFoundOrForbidden { .. }));
        assert!(store.last_error().is_some());
    }

    #[tokio::test]
    async fn test_tasks_by_category_is_order_preserving_subset() {
        let (_backend, store, _user) = initialized_store().await;
        let target = store.categories()[0].id;
        let other = store.categories()[1].id;

        for title in ["a", "b", "c"] {
            store
                .create_task(TaskDraft::new(title, target))
                .await
                .unwrap();
        }
        store
            .create_task(TaskDraft::new("elsewhere", other))
            .await
            .unwrap();
        let probe = store.inner.clone();
        eventually(move || probe.read().unwrap().tasks.len() == 4).await;

        let subset = store.tasks_by_category(target);
        let titles: Vec<&str> = subset.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_stale_feed_events_are_discarded_after_session_change() {
        let (backend, store, user) = initialized_store().await;
        let category_id = store.categories()[0].id;

        // Session ends; the store resets for anonymous.
        store.initialize(None).await.unwrap();

        // The old user's rows keep changing server-side.
        backend
            .insert_task(user.id, TaskDraft::new("late arrival", category_id))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_require_a_session() {
        let backend = Arc::new(MemoryBackend::new());
        let store = TaskStore::new(backend);

        let err = store
            .create_task(TaskDraft::new("nobody home", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NoSession));
    }
}
