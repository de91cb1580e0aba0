//! Task entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A task as the application sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned by the backend on insert.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the task is done.
    pub completed: bool,
    /// Assigned once by the backend at creation, never mutated.
    pub created_at: DateTime<Utc>,
    /// Category this task is filed under.
    pub category_id: Uuid,
    /// Owning user. Always the current session's user id.
    pub owner_id: Uuid,
}

/// A task as persisted by the backend (snake_case column shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRow {
    /// Unique identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Whether the task is done.
    pub completed: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Category id column.
    pub category_id: Uuid,
    /// Owning user id column.
    pub owner_id: Uuid,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            created_at: row.created_at,
            category_id: row.category_id,
            owner_id: row.owner_id,
        }
    }
}

/// Fields the caller supplies when creating a task.
///
/// The backend assigns the id and `created_at`; the store supplies the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Task title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Initial completion state. Defaults to false.
    pub completed: bool,
    /// Category the task is filed under.
    pub category_id: Uuid,
}

impl TaskDraft {
    /// Creates a new task draft filed under the given category.
    pub fn new(title: impl Into<String>, category_id: Uuid) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
            category_id,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial completion state.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// A sparse patch for a task. Absent fields are left untouched.
///
/// A patch can set a new description but not clear an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title, if changing.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New completion state, if changing.
    pub completed: Option<bool>,
    /// New category, if moving.
    pub category_id: Option<Uuid>,
}

impl TaskPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the completion state.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Moves the task to another category.
    pub fn with_category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Applies the present fields to a persisted row.
    pub fn apply_to(&self, row: &mut TaskRow) {
        if let Some(title) = &self.title {
            row.title = title.clone();
        }
        if let Some(description) = &self.description {
            row.description = Some(description.clone());
        }
        if let Some(completed) = self.completed {
            row.completed = completed;
        }
        if let Some(category_id) = self.category_id {
            row.category_id = category_id;
        }
    }
}
