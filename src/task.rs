//! Task data structure and the field bundles used to create and edit tasks.
//!
//! A task's column membership lives entirely in its `status` field, which names
//! a column id on the owning board. Moving a task never touches any collection
//! layout; it only rewrites `status`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::IssueType;

/// A unit of work on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Id of the column this task sits in.
    pub status: String,
    /// Display name of the assignee, stored by value.
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, alias = "issueType")]
    pub issue_type: IssueType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Refresh the modification timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Fields supplied when creating a task.
#[derive(Debug, Clone, Default)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub labels: Vec<String>,
    pub issue_type: IssueType,
}

impl TaskFields {
    /// Fields for a plain task with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A partial update to a task. `None` leaves the field unchanged.
///
/// Optional fields use a nested `Option` so they can be cleared:
/// `Some(None)` removes the value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub assignee: Option<Option<String>>,
    pub labels: Option<Vec<String>>,
    pub issue_type: Option<IssueType>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.assignee.is_none()
            && self.labels.is_none()
            && self.issue_type.is_none()
    }
}

/// Normalise a label by trimming and lowercasing.
pub fn normalise_label(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Split comma-separated label inputs, normalise, sort and dedup.
pub fn split_and_normalise_labels(inputs: &[String]) -> Vec<String> {
    let mut labels: Vec<String> = inputs
        .iter()
        .flat_map(|raw| raw.split(','))
        .map(normalise_label)
        .filter(|l| !l.is_empty())
        .collect();
    labels.sort();
    labels.dedup();
    labels
}

/// Trim an optional text field, treating blank input as absent.
pub fn clean_optional(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
