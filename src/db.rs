//! Board repository.
//!
//! This module provides the `Database` struct, the single owner of every board
//! and the active-board pointer. All mutation goes through its methods; each
//! one validates its arguments before touching state, so a rejected call never
//! leaves a partial change behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::board::{Board, Column};
use crate::drag::{self, TaskMoved};
use crate::error::{Result, TrackflowError};
use crate::fields::DEFAULT_BOARD_NAME;
use crate::store::KeyValueStore;
use crate::task::{clean_optional, split_and_normalise_labels, Task, TaskFields, TaskPatch};

/// Key under which the whole repository is stored.
pub const STORAGE_KEY: &str = "boards";

/// In-memory repository of boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub boards: Vec<Board>,
    #[serde(default)]
    pub active_board: Option<String>,
}

impl Default for Database {
    /// A fresh repository holding a single empty board.
    fn default() -> Self {
        let board = Board::new(DEFAULT_BOARD_NAME);
        Database {
            active_board: Some(board.id.clone()),
            boards: vec![board],
        }
    }
}

impl Database {
    /// Build a repository from existing boards. An empty list yields the default state.
    pub fn from_boards(boards: Vec<Board>) -> Self {
        if boards.is_empty() {
            return Database::default();
        }
        let active_board = boards.first().map(|b| b.id.clone());
        Database { boards, active_board }
    }

    /// Load the repository from a store, starting fresh if it is missing or unreadable.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(STORAGE_KEY) {
            Ok(Some(value)) => match Self::from_value(value) {
                Ok(db) => db,
                Err(e) => {
                    warn!(error = %e, "stored boards unusable, starting fresh");
                    Database::default()
                }
            },
            Ok(None) => Database::default(),
            Err(e) => {
                warn!(error = %e, "error reading stored boards, starting fresh");
                Database::default()
            }
        }
    }

    /// Save the whole repository as one document.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(STORAGE_KEY, serde_json::to_value(self)?)?;
        debug!(boards = self.boards.len(), "repository saved");
        Ok(())
    }

    /// Decode a stored document, repairing what can be repaired.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut db: Database = serde_json::from_value(value)?;
        if db.boards.is_empty() {
            return Err(TrackflowError::InvariantViolation(
                "stored repository has no boards".into(),
            ));
        }
        for board in db.boards.iter_mut() {
            let before = board.tasks.len();
            let columns: Vec<String> = board.columns.iter().map(|c| c.id.clone()).collect();
            board.tasks.retain(|t| columns.contains(&t.status));
            if board.tasks.len() != before {
                warn!(board = %board.id, dropped = before - board.tasks.len(), "dropped orphaned tasks");
            }
        }
        let active_ok = db
            .active_board
            .as_deref()
            .is_some_and(|id| db.boards.iter().any(|b| b.id == id));
        if !active_ok {
            db.active_board = db.boards.first().map(|b| b.id.clone());
        }
        Ok(db)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // ----- lookups -----

    /// Get a board by id.
    pub fn board(&self, id: &str) -> Result<&Board> {
        self.boards
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| TrackflowError::board_not_found(id))
    }

    /// Get a mutable reference to a board by id.
    pub fn board_mut(&mut self, id: &str) -> Result<&mut Board> {
        self.boards
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| TrackflowError::board_not_found(id))
    }

    /// The board operations default to.
    pub fn active_board(&self) -> &Board {
        self.active_board
            .as_deref()
            .and_then(|id| self.boards.iter().find(|b| b.id == id))
            .unwrap_or(&self.boards[0])
    }

    pub fn active_board_id(&self) -> String {
        self.active_board().id.clone()
    }

    /// Make a board the active one.
    pub fn set_active_board(&mut self, id: &str) -> Result<()> {
        self.board(id)?;
        self.active_board = Some(id.to_string());
        Ok(())
    }

    /// Resolve a board identifier (id, id prefix, or name) to a board id.
    pub fn resolve_board(&self, identifier: &str) -> Result<String> {
        resolve_identifier(
            "board",
            identifier,
            self.boards.iter().map(|b| (b.id.as_str(), b.name.as_str())),
        )
    }

    /// Resolve a column identifier (id, id prefix, or label) on a board.
    pub fn resolve_column(&self, board_id: &str, identifier: &str) -> Result<String> {
        let board = self.board(board_id)?;
        resolve_identifier(
            "column",
            identifier,
            board.columns.iter().map(|c| (c.id.as_str(), c.label.as_str())),
        )
    }

    /// Resolve a task identifier (id, id prefix, or title) on a board.
    pub fn resolve_task(&self, board_id: &str, identifier: &str) -> Result<String> {
        let board = self.board(board_id)?;
        resolve_identifier(
            "task",
            identifier,
            board.tasks.iter().map(|t| (t.id.as_str(), t.title.as_str())),
        )
    }

    // ----- boards -----

    /// Create a board with the standard columns and make it active.
    pub fn create_board(&mut self, name: &str) -> Result<String> {
        let name = required(name, "board name")?;
        let board = Board::new(&name);
        let id = board.id.clone();
        self.boards.push(board);
        self.active_board = Some(id.clone());
        info!(board = %id, name = %name, "board created");
        Ok(id)
    }

    /// Delete a board. The last remaining board cannot be deleted.
    pub fn delete_board(&mut self, id: &str) -> Result<()> {
        let idx = self
            .boards
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| TrackflowError::board_not_found(id))?;
        if self.boards.len() == 1 {
            return Err(TrackflowError::InvariantViolation(
                "at least one board is required".into(),
            ));
        }
        let removed = self.boards.remove(idx);
        if self.active_board.as_deref() == Some(id) {
            self.active_board = self.boards.first().map(|b| b.id.clone());
        }
        info!(board = %id, tasks = removed.tasks.len(), "board deleted");
        Ok(())
    }

    pub fn rename_board(&mut self, id: &str, name: &str) -> Result<()> {
        let name = required(name, "board name")?;
        let board = self.board_mut(id)?;
        board.name = name;
        info!(board = %id, "board renamed");
        Ok(())
    }

    /// Remove every column and task from a board, keeping its id and name.
    pub fn clear_board(&mut self, id: &str) -> Result<()> {
        let board = self.board_mut(id)?;
        let tasks = board.tasks.len();
        board.columns.clear();
        board.tasks.clear();
        info!(board = %id, tasks, "board cleared");
        Ok(())
    }

    // ----- columns -----

    /// Append a column to a board.
    pub fn add_column(&mut self, board_id: &str, label: &str, wip_limit: Option<u32>) -> Result<String> {
        let label = required(label, "column label")?;
        let board = self.board_mut(board_id)?;
        let mut column = Column::new(&label);
        column.wip_limit = wip_limit;
        let id = column.id.clone();
        board.columns.push(column);
        info!(board = %board_id, column = %id, "column added");
        Ok(id)
    }

    pub fn rename_column(&mut self, board_id: &str, column_id: &str, label: &str) -> Result<()> {
        let label = required(label, "column label")?;
        let column = self
            .board_mut(board_id)?
            .column_mut(column_id)
            .ok_or_else(|| TrackflowError::column_not_found(column_id))?;
        column.label = label;
        Ok(())
    }

    /// Set or clear a column's advisory WIP limit.
    pub fn set_wip_limit(&mut self, board_id: &str, column_id: &str, limit: Option<u32>) -> Result<()> {
        let column = self
            .board_mut(board_id)?
            .column_mut(column_id)
            .ok_or_else(|| TrackflowError::column_not_found(column_id))?;
        column.wip_limit = limit;
        Ok(())
    }

    /// Delete a column together with every task in it.
    ///
    /// Irreversible. Callers must confirm with the user before calling.
    /// Returns the number of tasks removed.
    pub fn delete_column(&mut self, board_id: &str, column_id: &str) -> Result<usize> {
        let board = self.board_mut(board_id)?;
        let idx = board
            .column_index(column_id)
            .ok_or_else(|| TrackflowError::column_not_found(column_id))?;
        board.columns.remove(idx);
        let before = board.tasks.len();
        board.tasks.retain(|t| t.status != column_id);
        let removed = before - board.tasks.len();
        info!(board = %board_id, column = %column_id, tasks = removed, "column deleted");
        Ok(removed)
    }

    /// Move a column to `target_index`, counted with the column removed.
    pub fn reorder_column(&mut self, board_id: &str, column_id: &str, target_index: usize) -> Result<bool> {
        let changed = drag::reorder_column_on(self.board_mut(board_id)?, column_id, target_index)?;
        if changed {
            info!(board = %board_id, column = %column_id, index = target_index, "column reordered");
        }
        Ok(changed)
    }

    /// Drop one column onto another's slot.
    pub fn move_column_onto(&mut self, board_id: &str, dragged: &str, target: &str) -> Result<bool> {
        let changed = drag::move_column_onto_on(self.board_mut(board_id)?, dragged, target)?;
        if changed {
            info!(board = %board_id, column = %dragged, onto = %target, "column reordered");
        }
        Ok(changed)
    }

    // ----- tasks -----

    /// Create a task in a column.
    pub fn create_task(
        &mut self,
        board_id: &str,
        column_id: &str,
        fields: TaskFields,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let title = required(&fields.title, "task title")?;
        let board = self.board_mut(board_id)?;
        if !board.has_column(column_id) {
            return Err(TrackflowError::Validation(format!(
                "column '{}' does not exist on board '{}'",
                column_id, board.name
            )));
        }
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title,
            description: clean_optional(fields.description),
            status: column_id.to_string(),
            assignee: clean_optional(fields.assignee),
            labels: split_and_normalise_labels(&fields.labels),
            issue_type: fields.issue_type,
            created_at: now,
            updated_at: now,
        };
        let id = task.id.clone();
        board.tasks.push(task);
        info!(board = %board_id, task = %id, column = %column_id, "task created");
        Ok(id)
    }

    /// Merge a patch into a task. Never changes the task's column.
    pub fn update_task(&mut self, board_id: &str, task_id: &str, patch: TaskPatch, now: DateTime<Utc>) -> Result<()> {
        let title = patch
            .title
            .as_deref()
            .map(|t| required(t, "task title"))
            .transpose()?;
        let task = self
            .board_mut(board_id)?
            .task_mut(task_id)
            .ok_or_else(|| TrackflowError::task_not_found(task_id))?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = clean_optional(description);
        }
        if let Some(assignee) = patch.assignee {
            task.assignee = clean_optional(assignee);
        }
        if let Some(labels) = patch.labels {
            task.labels = split_and_normalise_labels(&labels);
        }
        if let Some(issue_type) = patch.issue_type {
            task.issue_type = issue_type;
        }
        task.touch(now);
        info!(board = %board_id, task = %task_id, "task updated");
        Ok(())
    }

    /// Delete a task. Returns `false` if it was already gone.
    pub fn delete_task(&mut self, board_id: &str, task_id: &str) -> Result<bool> {
        let board = self.board_mut(board_id)?;
        let before = board.tasks.len();
        board.tasks.retain(|t| t.id != task_id);
        let removed = board.tasks.len() != before;
        if removed {
            info!(board = %board_id, task = %task_id, "task deleted");
        } else {
            debug!(board = %board_id, task = %task_id, "task already absent");
        }
        Ok(removed)
    }

    /// Move a task from `source_column` to `target_column`.
    pub fn move_task(
        &mut self,
        board_id: &str,
        task_id: &str,
        source_column: &str,
        target_column: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TaskMoved>> {
        let moved = drag::move_task_on(self.board_mut(board_id)?, task_id, source_column, target_column, now)?;
        if let Some(ref m) = moved {
            info!(board = %board_id, task = %m.task_id, from = %m.from_column, to = %m.to_column, "task moved");
        }
        Ok(moved)
    }

    /// Move a task to `target_column` from wherever it currently sits.
    pub fn reassign_task_column(
        &mut self,
        board_id: &str,
        task_id: &str,
        target_column: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TaskMoved>> {
        let source = self
            .board(board_id)?
            .task(task_id)
            .map(|t| t.status.clone())
            .ok_or_else(|| TrackflowError::task_not_found(task_id))?;
        self.move_task(board_id, task_id, &source, target_column, now)
    }
}

/// Trim a required text field, rejecting blank input.
fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TrackflowError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Shortest id prefix accepted when resolving identifiers.
const MIN_PREFIX_LEN: usize = 4;

/// Whether `identifier` looks like the start of a uuid.
fn is_id_prefix(identifier: &str) -> bool {
    identifier.len() >= MIN_PREFIX_LEN
        && identifier.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}

/// Resolve an identifier against `(id, name)` pairs.
///
/// Exact id wins, then a case-insensitive name match, then a unique id prefix
/// of at least [`MIN_PREFIX_LEN`] hex characters. Blank identifiers are
/// rejected. Multiple matches produce an error listing the candidates.
fn resolve_identifier<'a>(
    kind: &'static str,
    identifier: &str,
    items: impl Iterator<Item = (&'a str, &'a str)> + Clone,
) -> Result<String> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return Err(TrackflowError::Validation(format!("{} identifier cannot be empty", kind)));
    }

    if let Some((id, _)) = items.clone().find(|(id, _)| *id == trimmed) {
        return Ok(id.to_string());
    }

    let lower = trimmed.to_lowercase();
    let by_name: Vec<(&str, &str)> = items
        .clone()
        .filter(|(_, name)| name.to_lowercase() == lower)
        .collect();
    let matches = if !by_name.is_empty() {
        by_name
    } else if is_id_prefix(trimmed) {
        items.filter(|(id, _)| id.starts_with(trimmed)).collect()
    } else {
        Vec::new()
    };

    match matches.len() {
        0 => Err(TrackflowError::NotFound { kind, id: identifier.to_string() }),
        1 => Ok(matches[0].0.to_string()),
        _ => {
            let mut msg = format!("multiple {}s match '{}':\n", kind, identifier);
            for (id, name) in matches {
                msg.push_str(&format!("  {}: {}\n", id, name));
            }
            msg.push_str("Please use the specific id instead.");
            Err(TrackflowError::Validation(msg))
        }
    }
}
