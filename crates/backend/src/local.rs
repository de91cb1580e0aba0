//! Local JSON-file backend, the offline fallback.
//!
//! Two flat files under a data directory hold the full task and category
//! lists. They are read once when the backend is opened and rewritten on
//! every mutation. Corrupt content is discarded and treated as empty.

use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use entities::{CategoryDraft, CategoryPatch, CategoryRow, TaskDraft, TaskPatch, TaskRow};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::{feed::OwnerFeed, BackendError, BackendResult, ChangeEvent, TableBackend};

const TASKS_FILE: &str = "tasks.json";
const CATEGORIES_FILE: &str = "categories.json";

/// Row store persisted as JSON files on the local filesystem.
///
/// Offers the same owner-scoping and change-feed semantics as a hosted
/// backend, so the stores above it cannot tell the difference.
#[derive(Debug)]
pub struct LocalBackend {
    dir: PathBuf,
    tasks: RwLock<Vec<TaskRow>>,
    categories: RwLock<Vec<CategoryRow>>,
    task_feed: OwnerFeed<TaskRow>,
    category_feed: OwnerFeed<CategoryRow>,
}

impl LocalBackend {
    /// Opens the backend, creating the data directory if needed and loading
    /// whatever records already exist.
    pub fn open(dir: impl Into<PathBuf>) -> BackendResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let tasks = load_records(&dir.join(TASKS_FILE));
        let categories = load_records(&dir.join(CATEGORIES_FILE));

        Ok(Self {
            dir,
            tasks: RwLock::new(tasks),
            categories: RwLock::new(categories),
            task_feed: OwnerFeed::new(),
            category_feed: OwnerFeed::new(),
        })
    }

    fn persist_tasks(&self, tasks: &[TaskRow]) -> BackendResult<()> {
        write_records(&self.dir.join(TASKS_FILE), tasks)
    }

    fn persist_categories(&self, categories: &[CategoryRow]) -> BackendResult<()> {
        write_records(&self.dir.join(CATEGORIES_FILE), categories)
    }
}

fn load_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read records; starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding corrupt records");
            Vec::new()
        }
    }
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> BackendResult<()> {
    let contents = serde_json::to_string_pretty(records)?;
    fs::write(path, contents)?;
    Ok(())
}

#[async_trait]
impl TableBackend for LocalBackend {
    async fn list_tasks(&self, owner_id: Uuid) -> BackendResult<Vec<TaskRow>> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_task(&self, owner_id: Uuid, draft: TaskDraft) -> BackendResult<TaskRow> {
        {
            let categories = self.categories.read().await;
            if !categories
                .iter()
                .any(|c| c.id == draft.category_id && c.owner_id == owner_id)
            {
                return Err(BackendError::ForeignKeyViolation(format!(
                    "tasks.category_id references missing category {}",
                    draft.category_id
                )));
            }
        }

        let row = TaskRow {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            completed: draft.completed,
            created_at: Utc::now(),
            category_id: draft.category_id,
            owner_id,
        };

        // Mutations are staged and only committed once the file write
        // succeeds, so a persist failure leaves the served rows unchanged.
        let mut tasks = self.tasks.write().await;
        let mut staged = tasks.clone();
        staged.push(row.clone());
        self.persist_tasks(&staged)?;
        *tasks = staged;
        drop(tasks);

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
        let mut tasks = self.tasks.write().await;
        let mut staged = tasks.clone();
        let row = staged
            .iter_mut()
            .find(|t| t.id == id && t.owner_id == owner_id)
            .ok_or_else(|| BackendError::row_not_found("task", id))?;
        patch.apply_to(row);
        let row = row.clone();
        self.persist_tasks(&staged)?;
        *tasks = staged;
        drop(tasks);

        self.task_feed
            .publish(owner_id, ChangeEvent::Updated { new: row.clone() });
        Ok(row)
    }

    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> BackendResult<u64> {
        let mut tasks = self.tasks.write().await;
        let mut staged = tasks.clone();
        staged.retain(|t| !(t.id == id && t.owner_id == owner_id));
        let removed = (tasks.len() - staged.len()) as u64;
        if removed > 0 {
            self.persist_tasks(&staged)?;
            *tasks = staged;
        }
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
        let mut tasks = self.tasks.write().await;
        let removed_ids: Vec<Uuid> = tasks
            .iter()
            .filter(|t| t.category_id == category_id && t.owner_id == owner_id)
            .map(|t| t.id)
            .collect();
        if !removed_ids.is_empty() {
            let mut staged = tasks.clone();
            staged.retain(|t| !(t.category_id == category_id && t.owner_id == owner_id));
            self.persist_tasks(&staged)?;
            *tasks = staged;
        }
        drop(tasks);

        for id in &removed_ids {
            self.task_feed
                .publish(owner_id, ChangeEvent::Deleted { id: *id, owner_id });
        }
        Ok(removed_ids.len() as u64)
    }

    async fn list_categories(&self, owner_id: Uuid) -> BackendResult<Vec<CategoryRow>> {
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
        let row = CategoryRow {
            id: Uuid::new_v4(),
            name: draft.name,
            color: draft.color,
            owner_id,
        };

        let mut categories = self.categories.write().await;
        let mut staged = categories.clone();
        staged.push(row.clone());
        self.persist_categories(&staged)?;
        *categories = staged;
        drop(categories);

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
        let mut categories = self.categories.write().await;
        let mut staged = categories.clone();
        let row = staged
            .iter_mut()
            .find(|c| c.id == id && c.owner_id == owner_id)
            .ok_or_else(|| BackendError::row_not_found("category", id))?;
        patch.apply_to(row);
        let row = row.clone();
        self.persist_categories(&staged)?;
        *categories = staged;
        drop(categories);

        self.category_feed
            .publish(owner_id, ChangeEvent::Updated { new: row.clone() });
        Ok(row)
    }

    async fn delete_category(&self, id: Uuid, owner_id: Uuid) -> BackendResult<u64> {
        let mut categories = self.categories.write().await;
        let mut staged = categories.clone();
        staged.retain(|c| !(c.id == id && c.owner_id == owner_id));
        let removed = (categories.len() - staged.len()) as u64;
        if removed > 0 {
            self.persist_categories(&staged)?;
            *categories = staged;
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Uuid::new_v4();

        {
            let backend = LocalBackend::open(dir.path()).unwrap();
            let category = backend
                .insert_category(owner, CategoryDraft::new("Personal", "#6366F1"))
                .await
                .unwrap();
            backend
                .insert_task(owner, TaskDraft::new("Call the bank", category.id))
                .await
                .unwrap();
        }

        let reopened = LocalBackend::open(dir.path()).unwrap();
        let tasks = reopened.list_tasks(owner).await.unwrap();
        let categories = reopened.list_categories(owner).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Call the bank");
        assert_eq!(categories.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TASKS_FILE), "{not json").unwrap();

        let backend = LocalBackend::open(dir.path()).unwrap();
        let tasks = backend.list_tasks(Uuid::new_v4()).await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_rows_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the tasks file makes every write fail.
        fs::create_dir(dir.path().join(TASKS_FILE)).unwrap();

        let backend = LocalBackend::open(dir.path()).unwrap();
        let owner = Uuid::new_v4();
        let category = backend
            .insert_category(owner, CategoryDraft::new("Personal", "#6366F1"))
            .await
            .unwrap();

        let err = backend
            .insert_task(owner, TaskDraft::new("doomed", category.id))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Io(_)));

        // The failed insert must not leave a phantom row behind.
        assert!(backend.list_tasks(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_emit_feed_events() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::open(dir.path()).unwrap();
        let owner = Uuid::new_v4();
        let mut rx = backend.subscribe_categories(owner);

        let category = backend
            .insert_category(owner, CategoryDraft::new("Health", "#10B981"))
            .await
            .unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            ChangeEvent::Inserted { .. }
        ));

        backend
            .update_category(category.id, owner, CategoryPatch::new().with_name("Fitness"))
            .await
            .unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            ChangeEvent::Updated { .. }
        ));

        assert_eq!(backend.delete_category(category.id, owner).await.unwrap(), 1);
        assert!(matches!(
            rx.try_recv().unwrap(),
            ChangeEvent::Deleted { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::open(dir.path()).unwrap();

        let removed = backend
            .delete_task(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
