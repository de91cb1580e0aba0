//! In-memory backend implementation for tests and demos.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use entities::{CategoryDraft, CategoryPatch, CategoryRow, TaskDraft, TaskPatch, TaskRow, User};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::{
    feed::OwnerFeed, AuthBackend, AuthEvent, BackendError, BackendResult, ChangeEvent, Session,
    TableBackend,
};

/// Capacity for the auth event channel.
const AUTH_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

/// In-memory backend implementing both the auth service and the row store.
///
/// Rows are kept in insertion order, matching what a real backend would
/// return when listing by creation time. Table-call counters are exposed so
/// tests can assert that a code path never reached the backend.
#[derive(Debug)]
pub struct MemoryBackend {
    accounts: RwLock<HashMap<String, Account>>,
    session: RwLock<Option<Session>>,
    auth_tx: broadcast::Sender<AuthEvent>,
    tasks: RwLock<Vec<TaskRow>>,
    categories: RwLock<Vec<CategoryRow>>,
    task_feed: OwnerFeed<TaskRow>,
    category_feed: OwnerFeed<CategoryRow>,
    table_calls: AtomicUsize,
}

impl MemoryBackend {
    /// Creates an empty backend with no accounts or rows.
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            auth_tx: broadcast::channel(AUTH_CHANNEL_CAPACITY).0,
            tasks: RwLock::new(Vec::new()),
            categories: RwLock::new(Vec::new()),
            task_feed: OwnerFeed::new(),
            category_feed: OwnerFeed::new(),
            table_calls: AtomicUsize::new(0),
        }
    }

    /// Number of table operations (reads and writes) received so far.
    pub fn table_calls(&self) -> usize {
        self.table_calls.load(Ordering::SeqCst)
    }

    fn count_call(&self) {
        self.table_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn set_session(&self, session: Option<Session>) {
        let event = match &session {
            Some(s) => AuthEvent::SignedIn(s.clone()),
            None => AuthEvent::SignedOut,
        };
        *self.session.write().await = session;
        // Ignore send errors (no subscribers)
        let _ = self.auth_tx.send(event);
    }

    async fn ensure_category_exists(&self, category_id: Uuid, owner_id: Uuid) -> BackendResult<()> {
        let categories = self.categories.read().await;
        if categories
            .iter()
            .any(|c| c.id == category_id && c.owner_id == owner_id)
        {
            Ok(())
        } else {
            Err(BackendError::ForeignKeyViolation(format!(
                "tasks.category_id references missing category {category_id}"
            )))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn session(&self) -> BackendResult<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(email)
            .filter(|a| a.password == password)
            .ok_or(BackendError::InvalidCredentials)?;
        let session = Session::new(account.user.clone());
        drop(accounts);

        self.set_session(Some(session.clone())).await;
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> BackendResult<Session> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(BackendError::EmailTaken(email.to_string()));
        }

        let user = User::new(Uuid::new_v4(), email, name);
        accounts.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        drop(accounts);

        let session = Session::new(user);
        self.set_session(Some(session.clone())).await;
        Ok(session)
    }

    async fn sign_out(&self) -> BackendResult<()> {
        self.set_session(None).await;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_tx.subscribe()
    }
}

#[async_trait]
impl TableBackend for MemoryBackend {
    async fn list_tasks(&self, owner_id: Uuid) -> BackendResult<Vec<TaskRow>> {
        self.count_call();
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_task(&self, owner_id: Uuid, draft: TaskDraft) -> BackendResult<TaskRow> {
        self.count_call();
        self.ensure_category_exists(draft.category_id, owner_id)
            .await?;

        let row = TaskRow {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            completed: draft.completed,
            created_at: Utc::now(),
            category_id: draft.category_id,
            owner_id,
        };

        self.tasks.write().await.push(row.clone());
        self.task_feed
            .publish(owner_id, ChangeEvent::Inserted { new: row.clone() });
        Ok(row)
    }

    async fn update_task(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: TaskPatch,
    ) -> BackendResult<TaskRow> {
        self.count_call();
        if let Some(category_id) = patch.category_id {
            self.ensure_category_exists(category_id, owner_id).await?;
        }

        let mut tasks = self.tasks.write().await;
        let row = tasks
            .iter_mut()
            .find(|t| t.id == id && t.owner_id == owner_id)
            .ok_or_else(|| BackendError::row_not_found("task", id))?;
        patch.apply_to(row);
        let row = row.clone();
        drop(tasks);

        self.task_feed
            .publish(owner_id, ChangeEvent::Updated { new: row.clone() });
        Ok(row)
    }

    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> BackendResult<u64> {
        self.count_call();
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| !(t.id == id && t.owner_id == owner_id));
        let removed = (before - tasks.len()) as u64;
        drop(tasks);

        if removed > 0 {
            self.task_feed
                .publish(owner_id, ChangeEvent::Deleted { id, owner_id });
        }
        Ok(removed)
    }

    async fn delete_tasks_in_category(
        &self,
        category_id: Uuid,
        owner_id: Uuid,
    ) -> BackendResult<u64> {
        self.count_call();
        let mut tasks = self.tasks.write().await;
        let removed_ids: Vec<Uuid> = tasks
            .iter()
            .filter(|t| t.category_id == category_id && t.owner_id == owner_id)
            .map(|t| t.id)
            .collect();
        tasks.retain(|t| !(t.category_id == category_id && t.owner_id == owner_id));
        drop(tasks);

        for id in &removed_ids {
            self.task_feed
                .publish(owner_id, ChangeEvent::Deleted { id: *id, owner_id });
        }
        Ok(removed_ids.len() as u64)
    }

    async fn list_categories(&self, owner_id: Uuid) -> BackendResult<Vec<CategoryRow>> {
        self.count_call();
        let categories = self.categories.read().await;
        Ok(categories
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_category(
        &self,
        owner_id: Uuid,
        draft: CategoryDraft,
    ) -> BackendResult<CategoryRow> {
        self.count_call();
        let row = CategoryRow {
            id: Uuid::new_v4(),
            name: draft.name,
            color: draft.color,
            owner_id,
        };

        self.categories.write().await.push(row.clone());
        self.category_feed
            .publish(owner_id, ChangeEvent::Inserted { new: row.clone() });
        Ok(row)
    }

    async fn update_category(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: CategoryPatch,
    ) -> BackendResult<CategoryRow> {
        self.count_call();
        let mut categories = self.categories.write().await;
        let row = categories
            .iter_mut()
            .find(|c| c.id == id && c.owner_id == owner_id)
            .ok_or_else(|| BackendError::row_not_found("category", id))?;
        patch.apply_to(row);
        let row = row.clone();
        drop(categories);

        self.category_feed
            .publish(owner_id, ChangeEvent::Updated { new: row.clone() });
        Ok(row)
    }

    async fn delete_category(&self, id: Uuid, owner_id: Uuid) -> BackendResult<u64> {
        self.count_call();
        let mut categories = self.categories.write().await;
        let before = categories.len();
        categories.retain(|c| !(c.id == id && c.owner_id == owner_id));
        let removed = (before - categories.len()) as u64;
        drop(categories);

        if removed > 0 {
            self.category_feed
                .publish(owner_id, ChangeEvent::Deleted { id, owner_id });
        }
        Ok(removed)
    }

    fn subscribe_tasks(&self, owner_id: Uuid) -> broadcast::Receiver<ChangeEvent<TaskRow>> {
        self.task_feed.subscribe(owner_id)
    }

    fn subscribe_categories(
        &self,
        owner_id: Uuid,
    ) -> broadcast::Receiver<ChangeEvent<CategoryRow>> {
        self.category_feed.subscribe(owner_id)
    }
}
