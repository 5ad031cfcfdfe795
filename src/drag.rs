//! Drag-and-drop reordering.
//!
//! Two kinds of drag exist: a task dragged to another column, and a column
//! dragged onto another column's slot. The functions here compute and apply
//! those transitions on a single board; [`DragSession`] models the gesture
//! itself (start, hover, drop or abort) and only touches the repository on a
//! validated drop.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::board::Board;
use crate::db::Database;
use crate::error::{Result, TrackflowError};

/// Notification emitted when a task changes column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMoved {
    pub task_id: String,
    pub title: String,
    pub from_column: String,
    pub from_label: String,
    pub to_column: String,
    pub to_label: String,
}

impl std::fmt::Display for TaskMoved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Moved '{}' from {} to {}", self.title, self.from_label, self.to_label)
    }
}

/// Remove the item at `from` and insert it at `to`, where `to` indexes the
/// sequence after removal.
pub fn splice_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}

/// Move a task between columns of `board`.
///
/// Returns `Ok(None)` for a same-column drop, which leaves the task untouched.
pub fn move_task_on(
    board: &mut Board,
    task_id: &str,
    source_column: &str,
    target_column: &str,
    now: DateTime<Utc>,
) -> Result<Option<TaskMoved>> {
    let from_label = board
        .column(source_column)
        .map(|c| c.label.clone())
        .ok_or_else(|| TrackflowError::column_not_found(source_column))?;
    let to_label = board
        .column(target_column)
        .map(|c| c.label.clone())
        .ok_or_else(|| TrackflowError::column_not_found(target_column))?;

    let task = board
        .task_mut(task_id)
        .ok_or_else(|| TrackflowError::task_not_found(task_id))?;
    if task.status != source_column {
        return Err(TrackflowError::InvariantViolation(format!(
            "task '{}' is in column '{}', not '{}'",
            task.title, task.status, source_column
        )));
    }

    if source_column == target_column {
        debug!(task = task_id, column = source_column, "same-column drop ignored");
        return Ok(None);
    }

    task.status = target_column.to_string();
    task.touch(now);

    Ok(Some(TaskMoved {
        task_id: task.id.clone(),
        title: task.title.clone(),
        from_column: source_column.to_string(),
        from_label,
        to_column: target_column.to_string(),
        to_label,
    }))
}

/// Drop column `dragged` onto the slot of column `target`.
///
/// The dragged column is removed first, then inserted at the target's index in
/// the shortened list. Returns whether the order changed.
pub fn move_column_onto_on(board: &mut Board, dragged: &str, target: &str) -> Result<bool> {
    let from = board
        .column_index(dragged)
        .ok_or_else(|| TrackflowError::column_not_found(dragged))?;
    if !board.has_column(target) {
        return Err(TrackflowError::column_not_found(target));
    }
    if dragged == target {
        return Ok(false);
    }

    let column = board.columns.remove(from);
    // Both ids were checked above, so the target is still present.
    let to = board.column_index(target).unwrap_or(board.columns.len());
    board.columns.insert(to, column);
    Ok(from != to)
}

/// Move column `column` to `target_index` in the list with that column removed.
pub fn reorder_column_on(board: &mut Board, column: &str, target_index: usize) -> Result<bool> {
    let from = board
        .column_index(column)
        .ok_or_else(|| TrackflowError::column_not_found(column))?;
    if target_index >= board.columns.len() {
        return Err(TrackflowError::Validation(format!(
            "column index {} out of range (board has {} columns)",
            target_index,
            board.columns.len()
        )));
    }
    splice_move(&mut board.columns, from, target_index);
    Ok(from != target_index)
}

/// What the pointer picked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    Task { task_id: String, from_column: String },
    Column { column_id: String },
}

/// Where the pointer currently hovers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Column(String),
}

/// Result of finishing a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    TaskMoved(TaskMoved),
    ColumnsReordered { column_id: String },
    /// A valid drop that changed nothing.
    NoChange,
    /// Dropped outside any target, aborted, or the source went stale.
    Discarded,
}

/// Pending state of a drag gesture between pick-up and release.
#[derive(Debug, Default)]
pub struct DragSession {
    source: Option<DragSource>,
    candidate: Option<DropTarget>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin tracking a pickup. Any gesture already in flight is discarded.
    pub fn start(&mut self, source: DragSource) {
        self.source = Some(source);
        self.candidate = None;
    }

    /// Report the drop target under the pointer, or `None` when outside all.
    pub fn over(&mut self, target: Option<DropTarget>) {
        if self.source.is_some() {
            self.candidate = target;
        }
    }

    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<&DragSource> {
        self.source.as_ref()
    }

    pub fn candidate(&self) -> Option<&DropTarget> {
        self.candidate.as_ref()
    }

    /// Drop pending state without touching anything.
    pub fn abort(&mut self) {
        self.source = None;
        self.candidate = None;
    }

    /// Release the pointer over the current candidate.
    ///
    /// Stale references (the task or a column vanished mid-gesture) end in
    /// [`DropOutcome::Discarded`]; other errors propagate. Either way the
    /// repository is left untouched unless the drop commits.
    pub fn drop_on(&mut self, db: &mut Database, board_id: &str, now: DateTime<Utc>) -> Result<DropOutcome> {
        let source = self.source.take();
        let candidate = self.candidate.take();

        let (source, DropTarget::Column(target)) = match (source, candidate) {
            (Some(s), Some(t)) => (s, t),
            _ => return Ok(DropOutcome::Discarded),
        };

        let result = match source {
            DragSource::Task { task_id, from_column } => db
                .move_task(board_id, &task_id, &from_column, &target, now)
                .map(|moved| moved.map_or(DropOutcome::NoChange, DropOutcome::TaskMoved)),
            DragSource::Column { column_id } => db
                .move_column_onto(board_id, &column_id, &target)
                .map(|changed| {
                    if changed {
                        DropOutcome::ColumnsReordered { column_id }
                    } else {
                        DropOutcome::NoChange
                    }
                }),
        };

        match result {
            Err(e) if e.is_not_found() => {
                debug!(error = %e, "stale drop discarded");
                Ok(DropOutcome::Discarded)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Column;
    use crate::task::TaskFields;
    use chrono::Duration;

    fn abc_board() -> Board {
        Board {
            id: "b1".into(),
            name: "Board".into(),
            columns: vec![
                Column::with_id("A", "A"),
                Column::with_id("B", "B"),
                Column::with_id("C", "C"),
            ],
            tasks: Vec::new(),
        }
    }

    fn order(board: &Board) -> Vec<&str> {
        board.columns.iter().map(|c| c.id.as_str()).collect()
    }

    fn seeded_db() -> (Database, String, String) {
        let mut db = Database::from_boards(vec![abc_board()]);
        let now = Utc::now();
        let task = db.create_task("b1", "A", TaskFields::titled("x"), now).unwrap();
        (db, "b1".to_string(), task)
    }

    #[test]
    fn splice_is_not_a_swap() {
        let mut v = vec!['a', 'b', 'c', 'd'];
        splice_move(&mut v, 0, 2);
        assert_eq!(v, vec!['b', 'c', 'a', 'd']);
    }

    #[test]
    fn dropping_first_column_onto_last_uses_post_removal_index() {
        let mut board = abc_board();
        assert!(move_column_onto_on(&mut board, "A", "C").unwrap());
        assert_eq!(order(&board), vec!["B", "A", "C"]);
    }

    #[test]
    fn dropping_onto_right_neighbour_keeps_order() {
        let mut board = abc_board();
        assert!(!move_column_onto_on(&mut board, "A", "B").unwrap());
        assert_eq!(order(&board), vec!["A", "B", "C"]);
    }

    #[test]
    fn dropping_last_column_onto_first() {
        let mut board = abc_board();
        assert!(move_column_onto_on(&mut board, "C", "A").unwrap());
        assert_eq!(order(&board), vec!["C", "A", "B"]);
    }

    #[test]
    fn dropping_column_onto_itself_is_noop() {
        let mut board = abc_board();
        assert!(!move_column_onto_on(&mut board, "B", "B").unwrap());
        assert_eq!(order(&board), vec!["A", "B", "C"]);
    }

    #[test]
    fn reorder_to_index_checks_range() {
        let mut board = abc_board();
        assert!(reorder_column_on(&mut board, "A", 2).unwrap());
        assert_eq!(order(&board), vec!["B", "C", "A"]);
        assert!(matches!(
            reorder_column_on(&mut board, "A", 3),
            Err(TrackflowError::Validation(_))
        ));
        assert_eq!(order(&board), vec!["B", "C", "A"]);
    }

    #[test]
    fn task_move_rejects_wrong_source() {
        let (mut db, board, task) = seeded_db();
        let before = db.to_json().unwrap();
        let err = db.move_task(&board, &task, "B", "C", Utc::now()).unwrap_err();
        assert!(matches!(err, TrackflowError::InvariantViolation(_)));
        assert_eq!(db.to_json().unwrap(), before);
    }

    #[test]
    fn session_commits_task_move() {
        let (mut db, board, task) = seeded_db();
        let now = Utc::now() + Duration::seconds(5);

        let mut session = DragSession::new();
        session.start(DragSource::Task { task_id: task.clone(), from_column: "A".into() });
        session.over(Some(DropTarget::Column("B".into())));
        session.over(Some(DropTarget::Column("C".into())));

        match session.drop_on(&mut db, &board, now).unwrap() {
            DropOutcome::TaskMoved(moved) => {
                assert_eq!(moved.from_column, "A");
                assert_eq!(moved.to_column, "C");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        let t = db.board(&board).unwrap().task(&task).unwrap();
        assert_eq!(t.status, "C");
        assert_eq!(t.updated_at, now);
        assert!(!session.is_active());
    }

    #[test]
    fn drop_outside_targets_changes_nothing() {
        let (mut db, board, task) = seeded_db();
        let before = db.to_json().unwrap();

        let mut session = DragSession::new();
        session.start(DragSource::Task { task_id: task, from_column: "A".into() });
        session.over(Some(DropTarget::Column("B".into())));
        session.over(None);

        assert_eq!(session.drop_on(&mut db, &board, Utc::now()).unwrap(), DropOutcome::Discarded);
        assert_eq!(db.to_json().unwrap(), before);
    }

    #[test]
    fn aborted_gesture_changes_nothing() {
        let (mut db, board, _task) = seeded_db();
        let before = db.to_json().unwrap();

        let mut session = DragSession::new();
        session.start(DragSource::Column { column_id: "A".into() });
        session.over(Some(DropTarget::Column("C".into())));
        session.abort();

        assert_eq!(session.drop_on(&mut db, &board, Utc::now()).unwrap(), DropOutcome::Discarded);
        assert_eq!(db.to_json().unwrap(), before);
    }

    #[test]
    fn task_deleted_mid_gesture_is_discarded() {
        let (mut db, board, task) = seeded_db();

        let mut session = DragSession::new();
        session.start(DragSource::Task { task_id: task.clone(), from_column: "A".into() });
        session.over(Some(DropTarget::Column("B".into())));
        db.delete_task(&board, &task).unwrap();
        let before = db.to_json().unwrap();

        assert_eq!(session.drop_on(&mut db, &board, Utc::now()).unwrap(), DropOutcome::Discarded);
        assert_eq!(db.to_json().unwrap(), before);
    }

    #[test]
    fn task_drag_never_reorders_columns() {
        let (mut db, board, task) = seeded_db();

        let mut session = DragSession::new();
        session.start(DragSource::Task { task_id: task, from_column: "A".into() });
        session.over(Some(DropTarget::Column("C".into())));
        session.drop_on(&mut db, &board, Utc::now()).unwrap();

        assert_eq!(order(db.board(&board).unwrap()), vec!["A", "B", "C"]);
    }

    #[test]
    fn column_session_reorders() {
        let (mut db, board, _task) = seeded_db();

        let mut session = DragSession::new();
        session.start(DragSource::Column { column_id: "C".into() });
        session.over(Some(DropTarget::Column("A".into())));

        assert_eq!(
            session.drop_on(&mut db, &board, Utc::now()).unwrap(),
            DropOutcome::ColumnsReordered { column_id: "C".into() }
        );
        assert_eq!(order(db.board(&board).unwrap()), vec!["C", "A", "B"]);
    }

    #[test]
    fn hover_without_pickup_is_ignored() {
        let mut session = DragSession::new();
        session.over(Some(DropTarget::Column("A".into())));
        assert!(session.candidate().is_none());
    }
}
