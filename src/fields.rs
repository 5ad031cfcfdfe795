//! Enumerations and fixed vocabularies for boards and tasks.
//!
//! This module defines the issue types a task can carry, the label vocabulary
//! offered when tagging tasks, and the column template every new board starts with.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Classification of a task.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    #[serde(alias = "Bug")]
    Bug,
    #[serde(alias = "Feature")]
    Feature,
    #[default]
    #[serde(alias = "Task")]
    Task,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format_issue_type(*self))
    }
}

/// Format an issue type for display.
pub fn format_issue_type(t: IssueType) -> &'static str {
    match t {
        IssueType::Bug => "Bug",
        IssueType::Feature => "Feature",
        IssueType::Task => "Task",
    }
}

/// Labels offered when tagging a task. Tasks may carry labels outside this list.
pub const LABELS: [&str; 7] = [
    "backend",
    "blocker",
    "bug",
    "design required",
    "duplicate",
    "enhancement",
    "front-end",
];

/// Whether a label belongs to the offered vocabulary.
pub fn is_known_label(label: &str) -> bool {
    LABELS.contains(&label)
}

/// Column template for new boards, as `(id, label)` pairs in display order.
pub const BASE_COLUMNS: [(&str, &str); 4] = [
    ("todo", "To Do"),
    ("inprogress", "In Progress"),
    ("inreview", "In Review"),
    ("done", "Done"),
];

/// Name given to the board a fresh repository starts with.
pub const DEFAULT_BOARD_NAME: &str = "Main Board";
