//! Board and column structures.
//!
//! A board keeps its columns in display order and its tasks in insertion
//! order. Tasks point at columns through their `status` field; the column
//! vector alone decides left-to-right layout.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::BASE_COLUMNS;
use crate::task::Task;

/// A stage within a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub label: String,
    /// Advisory cap on tasks in this column. Shown, never enforced.
    #[serde(default, alias = "wipLimit", skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<u32>,
}

impl Column {
    /// Create a column with a generated id derived from its label.
    pub fn new(label: &str) -> Self {
        Column {
            id: generate_column_id(label),
            label: label.to_string(),
            wip_limit: None,
        }
    }

    /// Create a column with an explicit id.
    pub fn with_id(id: &str, label: &str) -> Self {
        Column {
            id: id.to_string(),
            label: label.to_string(),
            wip_limit: None,
        }
    }
}

/// A named kanban board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
}

impl Board {
    /// Create a board with a fresh id and the standard column template.
    pub fn new(name: &str) -> Self {
        Board {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            columns: base_columns(),
            tasks: Vec::new(),
        }
    }

    /// Get a column by id.
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Get a mutable reference to a column by id.
    pub fn column_mut(&mut self, id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    /// Position of a column in display order.
    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn has_column(&self, id: &str) -> bool {
        self.column_index(id).is_some()
    }

    /// Get a task by id.
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by id.
    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Tasks sitting in a column, in insertion order.
    pub fn tasks_in(&self, column_id: &str) -> impl Iterator<Item = &Task> + '_ {
        let column_id = column_id.to_string();
        self.tasks.iter().filter(move |t| t.status == column_id)
    }

    /// Tasks whose status does not name a column on this board.
    pub fn orphaned_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !self.has_column(&t.status)).collect()
    }
}

/// Fresh copy of the standard column template.
pub fn base_columns() -> Vec<Column> {
    BASE_COLUMNS
        .iter()
        .map(|(id, label)| Column::with_id(id, label))
        .collect()
}

/// Build a column id from a label plus a random suffix, so duplicate labels
/// never collide.
pub fn generate_column_id(label: &str) -> String {
    let slug = slugify(label);
    let suffix = Uuid::new_v4().simple().to_string();
    if slug.is_empty() {
        suffix
    } else {
        format!("{}-{}", slug, suffix)
    }
}

/// Convert a label to a lowercase, hyphen-separated slug.
pub fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
