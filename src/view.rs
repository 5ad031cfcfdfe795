//! Read-only projections over repository state.
//!
//! Every function here is recomputed from scratch on each call; nothing is
//! cached and nothing is mutated.

use std::collections::BTreeMap;

use crate::board::{Board, Column};
use crate::task::Task;

/// Tasks of one column, in insertion order.
#[derive(Debug, Clone)]
pub struct ColumnTasks<'a> {
    pub column: &'a Column,
    pub tasks: Vec<&'a Task>,
}

impl ColumnTasks<'_> {
    /// Whether the column holds more tasks than its advisory limit.
    pub fn over_wip_limit(&self) -> bool {
        self.column.wip_limit.is_some_and(|limit| self.tasks.len() > limit as usize)
    }
}

/// A task tagged with the board it lives on.
#[derive(Debug, Clone)]
pub struct AssignedTask<'a> {
    pub board_id: &'a str,
    pub board_name: &'a str,
    pub task: &'a Task,
}

/// Counts over one board's tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSummary {
    pub total: usize,
    pub by_column: BTreeMap<String, usize>,
    pub by_assignee: BTreeMap<String, usize>,
}

/// Group a board's tasks by column, in column order.
pub fn tasks_by_column(board: &Board) -> Vec<ColumnTasks<'_>> {
    board
        .columns
        .iter()
        .map(|column| ColumnTasks {
            column,
            tasks: board.tasks.iter().filter(|t| t.status == column.id).collect(),
        })
        .collect()
}

/// Every task across `boards` assigned to `assignee`.
pub fn tasks_by_assignee<'a>(boards: &'a [Board], assignee: &str) -> Vec<AssignedTask<'a>> {
    boards
        .iter()
        .flat_map(move |board| {
            board
                .tasks
                .iter()
                .filter(move |t| t.assignee.as_deref() == Some(assignee))
                .map(move |task| AssignedTask {
                    board_id: &board.id,
                    board_name: &board.name,
                    task,
                })
        })
        .collect()
}

/// Count tasks in total, per column and per assignee.
pub fn board_summary(board: &Board) -> BoardSummary {
    let mut summary = BoardSummary {
        total: 0,
        by_column: board.columns.iter().map(|c| (c.id.clone(), 0)).collect(),
        by_assignee: BTreeMap::new(),
    };
    for task in &board.tasks {
        summary.total += 1;
        *summary.by_column.entry(task.status.clone()).or_default() += 1;
        if let Some(name) = &task.assignee {
            *summary.by_assignee.entry(name.clone()).or_default() += 1;
        }
    }
    summary
}

/// Boards holding at least one task assigned to `assignee`.
pub fn boards_with_assignee_tasks<'a>(boards: &'a [Board], assignee: &str) -> Vec<&'a Board> {
    boards
        .iter()
        .filter(|b| b.tasks.iter().any(|t| t.assignee.as_deref() == Some(assignee)))
        .collect()
}

/// Leading part of an id, enough to tell items apart on screen.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Column header text, with the advisory limit when one is set.
pub fn column_heading(group: &ColumnTasks<'_>) -> String {
    match group.column.wip_limit {
        Some(limit) => format!("{} ({}/{})", group.column.label, group.tasks.len(), limit),
        None => format!("{} ({})", group.column.label, group.tasks.len()),
    }
}
