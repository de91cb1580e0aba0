//! Category entity definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A colored category that tasks are filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier, assigned by the backend on insert.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Hex color code, e.g. `#6366F1`.
    pub color: String,
    /// Owning user. Always the current session's user id.
    pub owner_id: Uuid,
}

/// A category as persisted by the backend (snake_case column shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Hex color code.
    pub color: String,
    /// Owning user id.
    pub owner_id: Uuid,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
            owner_id: row.owner_id,
        }
    }
}

/// Fields the caller supplies when creating a category.
///
/// The backend assigns the id; the store supplies the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    /// Display name.
    pub name: String,
    /// Hex color code.
    pub color: String,
}

impl CategoryDraft {
    /// Creates a new category draft.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// A sparse patch for a category. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    /// New display name, if changing.
    pub name: Option<String>,
    /// New color, if changing.
    pub color: Option<String>,
}

impl CategoryPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a new color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Applies the present fields to a persisted row.
    pub fn apply_to(&self, row: &mut CategoryRow) {
        if let Some(name) = &self.name {
            row.name = name.clone();
        }
        if let Some(color) = &self.color {
            row.color = color.clone();
        }
    }
}
