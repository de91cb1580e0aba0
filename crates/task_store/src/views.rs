//! Pure view derivation over the task collection.
//!
//! Nothing here is cached: visible lists and stats are recomputed from
//! scratch on every call, so there is no derived state to invalidate.

use entities::Task;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Completion filter applied to a category's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilterOption {
    /// Every task.
    #[default]
    All,
    /// Only tasks not yet completed.
    Active,
    /// Only completed tasks.
    Completed,
}

/// Sort order for the visible task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskSortOption {
    /// Most recently created first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Title ascending. Byte-wise comparison, not locale-aware collation,
    /// so uppercase titles sort before lowercase ones.
    Name,
    /// Accepted for compatibility with the UI's option set; sorts as
    /// `Newest` until tasks carry a due date.
    DueDate,
}

/// Aggregate statistics over a set of tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatsSummary {
    /// Number of tasks considered.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Tasks still open.
    pub pending: usize,
    /// `round(100 * completed / total)`, 0 when there are no tasks.
    pub completion_rate: u8,
}

/// Computes the visible, ordered task list for one category.
///
/// Selection, filter, then a stable sort; ties keep their reconciled order.
pub fn visible_tasks(
    tasks: &[Task],
    category_id: Uuid,
    filter: TaskFilterOption,
    sort: TaskSortOption,
) -> Vec<Task> {
    let mut selected: Vec<Task> = tasks
        .iter()
        .filter(|t| t.category_id == category_id)
        .filter(|t| match filter {
            TaskFilterOption::All => true,
            TaskFilterOption::Active => !t.completed,
            TaskFilterOption::Completed => t.completed,
        })
        .cloned()
        .collect();

    match sort {
        TaskSortOption::Newest | TaskSortOption::DueDate => {
            selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        TaskSortOption::Oldest => {
            selected.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }
        TaskSortOption::Name => {
            selected.sort_by(|a, b| a.title.cmp(&b.title));
        }
    }

    selected
}

/// Computes aggregate stats over a task set.
pub fn task_stats(tasks: &[Task]) -> TaskStatsSummary {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let pending = total - completed;
    let completion_rate = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    };

    TaskStatsSummary {
        total,
        completed,
        pending,
        completion_rate,
    }
}
