//! Kanban board interface.
//!
//! Columns are laid out side by side with their task cards. Tasks and columns
//! are moved with a keyboard drag: pick up with `m` (task) or `M` (column),
//! steer with Left/Right, drop with Enter or abort with Esc. The gesture is
//! tracked by a [`DragSession`], so nothing changes until the drop commits.

use std::io;
use std::time::Duration;

use chrono::{Local, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::board::Board;
use crate::db::Database;
use crate::drag::{DragSession, DragSource, DropOutcome, DropTarget};
use crate::fields::format_issue_type;
use crate::permissions::{authorize, Action, CurrentUser};
use crate::store::KeyValueStore;
use crate::task::{Task, TaskFields};
use crate::tui::colors::{issue_type_color, ACCENT, DRAGGED, DROP_HOVER, OVER_LIMIT};
use crate::tui::input::InputField;
use crate::view::{column_heading, short_id, tasks_by_column};

const HELP: &str = "m: Move task | M: Move list | a: Add task | A: Add list | x/X: Delete | Tab: Board | n: New board | /: Filter | Enter: Details | q: Quit";

/// What the keyboard is currently driving.
enum Mode {
    Normal,
    Filter,
    Input(NewItem, InputField),
    Confirm(Pending),
}

/// What a text prompt creates.
#[derive(Clone, Copy)]
enum NewItem {
    Task,
    Column,
    Board,
}

impl NewItem {
    fn prompt(self) -> &'static str {
        match self {
            NewItem::Task => "New task title",
            NewItem::Column => "New list name",
            NewItem::Board => "New board name",
        }
    }
}

/// A destructive action waiting for y/n.
enum Pending {
    DeleteTask { task_id: String, title: String },
    DeleteColumn { column_id: String, label: String, count: usize },
}

/// Visible cards of one column.
struct ColumnView {
    id: String,
    task_ids: Vec<String>,
}

/// Board application state.
pub struct BoardApp {
    db: Database,
    store: Box<dyn KeyValueStore>,
    user: CurrentUser,
    board_id: String,
    columns: Vec<ColumnView>,
    selected_column: usize,
    selected_card: usize,
    scroll_offsets: Vec<usize>,
    drag: DragSession,
    hover_column: usize,
    mode: Mode,
    filter_text: String,
    show_task_detail: bool,
    status_message: String,
}

impl BoardApp {
    /// Open the app on the repository's active board.
    pub fn new(db: Database, store: Box<dyn KeyValueStore>, user: CurrentUser) -> Self {
        let board_id = db.active_board_id();
        let mut app = BoardApp {
            db,
            store,
            user,
            board_id,
            columns: Vec::new(),
            selected_column: 0,
            selected_card: 0,
            scroll_offsets: Vec::new(),
            drag: DragSession::new(),
            hover_column: 0,
            mode: Mode::Normal,
            filter_text: String::new(),
            show_task_detail: false,
            status_message: String::new(),
        };
        app.refresh();
        app
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn into_db(self) -> Database {
        self.db
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        &*self.store
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    fn board(&self) -> Option<&Board> {
        self.db.board(&self.board_id).ok()
    }

    /// Rebuild the column cache from the repository, applying the filter.
    fn refresh(&mut self) {
        if self.db.board(&self.board_id).is_err() {
            self.board_id = self.db.active_board_id();
        }
        let filter = self.filter_text.to_lowercase();
        let columns: Vec<ColumnView> = match self.db.board(&self.board_id) {
            Ok(board) => tasks_by_column(board)
                .into_iter()
                .map(|group| ColumnView {
                    id: group.column.id.clone(),
                    task_ids: group
                        .tasks
                        .iter()
                        .filter(|t| filter.is_empty() || task_matches(t, &filter))
                        .map(|t| t.id.clone())
                        .collect(),
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        self.columns = columns;
        self.scroll_offsets.resize(self.columns.len(), 0);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.selected_column >= self.columns.len() {
            self.selected_column = self.columns.len().saturating_sub(1);
        }
        let len = self.columns.get(self.selected_column).map_or(0, |c| c.task_ids.len());
        if self.selected_card >= len {
            self.selected_card = len.saturating_sub(1);
        }
    }

    fn selected_column_id(&self) -> Option<String> {
        self.columns.get(self.selected_column).map(|c| c.id.clone())
    }

    fn selected_task(&self) -> Option<&Task> {
        let id = self.columns.get(self.selected_column)?.task_ids.get(self.selected_card)?;
        self.board()?.task(id)
    }

    /// Persist the repository. Failures are shown and the in-memory state kept.
    fn save(&mut self) -> bool {
        match self.db.save(&mut *self.store) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "save failed");
                self.status_message = format!("Error saving: {}", e);
                false
            }
        }
    }

    fn permit(&mut self, action: Action) -> bool {
        match authorize(&self.user, action) {
            Ok(()) => true,
            Err(e) => {
                self.status_message = e.to_string();
                false
            }
        }
    }

    /// Handle one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal if self.drag.is_active() => {
                self.handle_drag_key(key);
                false
            }
            Mode::Normal => self.handle_normal_key(key),
            Mode::Filter => {
                self.handle_filter_key(key);
                false
            }
            Mode::Input(item, field) => {
                self.handle_input_key(key, item, field);
                false
            }
            Mode::Confirm(pending) => {
                if key.code == KeyCode::Char('y') || key.code == KeyCode::Char('Y') {
                    self.confirm(pending);
                } else {
                    self.status_message = "Cancelled".to_string();
                }
                false
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        self.status_message.clear();
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.show_task_detail {
                    self.show_task_detail = false;
                } else {
                    return true;
                }
            }
            KeyCode::Enter => {
                self.show_task_detail = !self.show_task_detail && self.selected_task().is_some();
            }
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.selected_column + 1 < self.columns.len() {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => {
                self.selected_card = self.selected_card.saturating_sub(1);
            }
            KeyCode::Down => {
                let len = self.columns.get(self.selected_column).map_or(0, |c| c.task_ids.len());
                if self.selected_card + 1 < len {
                    self.selected_card += 1;
                }
            }
            KeyCode::Char('m') => self.pick_up_task(),
            KeyCode::Char('M') => self.pick_up_column(),
            KeyCode::Char('a') => {
                if self.selected_column_id().is_none() {
                    self.status_message = "Add a list first (A)".to_string();
                } else if self.permit(Action::EditTasks) {
                    self.mode = Mode::Input(NewItem::Task, InputField::new());
                }
            }
            KeyCode::Char('A') => {
                if self.permit(Action::EditBoard) {
                    self.mode = Mode::Input(NewItem::Column, InputField::new());
                }
            }
            KeyCode::Char('n') => {
                if self.permit(Action::CreateBoard) {
                    self.mode = Mode::Input(NewItem::Board, InputField::new());
                }
            }
            KeyCode::Char('x') => {
                let Some((task_id, title)) = self.selected_task().map(|t| (t.id.clone(), t.title.clone())) else {
                    return false;
                };
                if self.permit(Action::EditTasks) {
                    self.mode = Mode::Confirm(Pending::DeleteTask { task_id, title });
                }
            }
            KeyCode::Char('X') => {
                let Some(column_id) = self.selected_column_id() else {
                    return false;
                };
                if self.permit(Action::EditBoard) {
                    let (label, count) = self
                        .board()
                        .and_then(|b| b.column(&column_id).map(|c| (c.label.clone(), b.tasks_in(&column_id).count())))
                        .unwrap_or_default();
                    self.mode = Mode::Confirm(Pending::DeleteColumn { column_id, label, count });
                }
            }
            KeyCode::Tab => self.next_board(),
            KeyCode::Char('/') => self.mode = Mode::Filter,
            KeyCode::Char('h') => self.status_message = HELP.to_string(),
            _ => {}
        }
        false
    }

    // ----- drag -----

    fn pick_up_task(&mut self) {
        let Some((task_id, from_column)) = self.selected_task().map(|t| (t.id.clone(), t.status.clone())) else {
            return;
        };
        if !self.permit(Action::EditTasks) {
            return;
        }
        self.show_task_detail = false;
        self.drag.start(DragSource::Task { task_id, from_column });
        self.hover(self.selected_column);
    }

    fn pick_up_column(&mut self) {
        let Some(column_id) = self.selected_column_id() else {
            return;
        };
        if !self.permit(Action::EditBoard) {
            return;
        }
        self.show_task_detail = false;
        self.drag.start(DragSource::Column { column_id });
        self.hover(self.selected_column);
    }

    fn hover(&mut self, index: usize) {
        self.hover_column = index;
        let target = self.columns.get(index).map(|c| DropTarget::Column(c.id.clone()));
        self.drag.over(target);
    }

    fn handle_drag_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left if self.hover_column > 0 => self.hover(self.hover_column - 1),
            KeyCode::Right if self.hover_column + 1 < self.columns.len() => self.hover(self.hover_column + 1),
            KeyCode::Enter => self.drop_dragged(),
            KeyCode::Esc => {
                self.drag.abort();
                self.status_message = "Move cancelled".to_string();
            }
            _ => {}
        }
    }

    fn drop_dragged(&mut self) {
        let board_id = self.board_id.clone();
        match self.drag.drop_on(&mut self.db, &board_id, Utc::now()) {
            Ok(DropOutcome::TaskMoved(moved)) => {
                let saved = self.save();
                self.refresh();
                self.selected_column = self.hover_column;
                if let Some(pos) = self
                    .columns
                    .get(self.selected_column)
                    .and_then(|c| c.task_ids.iter().position(|id| *id == moved.task_id))
                {
                    self.selected_card = pos;
                }
                self.clamp_selection();
                if saved {
                    self.status_message = moved.to_string();
                }
            }
            Ok(DropOutcome::ColumnsReordered { column_id }) => {
                let saved = self.save();
                self.refresh();
                if let Some(pos) = self.columns.iter().position(|c| c.id == column_id) {
                    self.selected_column = pos;
                    self.clamp_selection();
                }
                if saved {
                    self.status_message = "List moved".to_string();
                }
            }
            Ok(DropOutcome::NoChange) => {}
            Ok(DropOutcome::Discarded) => {
                self.refresh();
                self.status_message = "Nothing to move".to_string();
            }
            Err(e) => {
                debug!(error = %e, "drop rejected");
                self.status_message = e.to_string();
            }
        }
    }

    // ----- text input -----

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter_text.clear();
                self.refresh();
                return;
            }
            KeyCode::Enter => return,
            KeyCode::Backspace => {
                self.filter_text.pop();
                self.refresh();
            }
            KeyCode::Char(c) => {
                self.filter_text.push(c);
                self.refresh();
            }
            _ => {}
        }
        self.mode = Mode::Filter;
    }

    fn handle_input_key(&mut self, key: KeyEvent, item: NewItem, mut field: InputField) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                let text = field.take();
                match item {
                    NewItem::Task => self.submit_task(text),
                    NewItem::Column => self.submit_column(text),
                    NewItem::Board => self.submit_board(text),
                }
                return;
            }
            KeyCode::Char(c) => field.handle_char(c),
            KeyCode::Backspace => field.handle_backspace(),
            KeyCode::Delete => field.handle_delete(),
            KeyCode::Left => field.move_cursor_left(),
            KeyCode::Right => field.move_cursor_right(),
            _ => {}
        }
        self.mode = Mode::Input(item, field);
    }

    fn submit_task(&mut self, title: String) {
        let Some(column_id) = self.selected_column_id() else {
            return;
        };
        let board_id = self.board_id.clone();
        match self.db.create_task(&board_id, &column_id, TaskFields::titled(title), Utc::now()) {
            Ok(id) => {
                if self.save() {
                    self.status_message = format!("Added task {}", short_id(&id));
                }
                self.refresh();
                if let Some(pos) = self
                    .columns
                    .get(self.selected_column)
                    .and_then(|c| c.task_ids.iter().position(|t| *t == id))
                {
                    self.selected_card = pos;
                }
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    fn submit_column(&mut self, label: String) {
        let board_id = self.board_id.clone();
        match self.db.add_column(&board_id, &label, None) {
            Ok(_) => {
                if self.save() {
                    self.status_message = format!("Added list '{}'", label);
                }
                self.refresh();
                self.selected_column = self.columns.len().saturating_sub(1);
                self.clamp_selection();
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    fn submit_board(&mut self, name: String) {
        match self.db.create_board(&name) {
            Ok(id) => {
                self.board_id = id;
                if self.save() {
                    self.status_message = format!("Created board '{}'", name);
                }
                self.selected_column = 0;
                self.selected_card = 0;
                self.refresh();
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    fn confirm(&mut self, pending: Pending) {
        let board_id = self.board_id.clone();
        match pending {
            Pending::DeleteTask { task_id, title } => match self.db.delete_task(&board_id, &task_id) {
                Ok(_) => {
                    if self.save() {
                        self.status_message = format!("Deleted '{}'", title);
                    }
                }
                Err(e) => self.status_message = e.to_string(),
            },
            Pending::DeleteColumn { column_id, label, .. } => match self.db.delete_column(&board_id, &column_id) {
                Ok(removed) => {
                    if self.save() {
                        self.status_message = format!("Deleted list '{}' and {} task(s)", label, removed);
                    }
                }
                Err(e) => self.status_message = e.to_string(),
            },
        }
        self.refresh();
    }

    /// Switch to the next board and make it the active one.
    fn next_board(&mut self) {
        let Some(pos) = self.db.boards.iter().position(|b| b.id == self.board_id) else {
            return;
        };
        let next = self.db.boards[(pos + 1) % self.db.boards.len()].id.clone();
        if next == self.board_id {
            return;
        }
        if self.db.set_active_board(&next).is_err() {
            return;
        }
        self.board_id = next;
        let saved = self.save();
        self.selected_column = 0;
        self.selected_card = 0;
        self.scroll_offsets.clear();
        self.refresh();
        if saved {
            if let Some(b) = self.board() {
                self.status_message = format!("Board: {}", b.name);
            }
        }
    }

    // ----- rendering -----

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_board(f, chunks[1]);
        self.render_status_bar(f, chunks[2]);

        if self.show_task_detail {
            self.render_task_detail_popup(f);
        }
        if let Mode::Input(item, field) = &self.mode {
            render_input_popup(f, item.prompt(), field);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let name = self.board().map(|b| b.name.as_str()).unwrap_or("-");
        let position = self
            .db
            .boards
            .iter()
            .position(|b| b.id == self.board_id)
            .map_or(0, |p| p + 1);
        let header = Line::from(vec![
            Span::styled(name.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  ({}/{})  ", position, self.db.boards.len())),
            Span::styled(
                format!("{} [{}]", self.user.name, self.user.role),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]);
        let block = Paragraph::new(header)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(block, area);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        if self.columns.is_empty() {
            let empty = Paragraph::new("No lists on this board. Press A to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(empty, area);
            return;
        }
        let count = self.columns.len() as u32;
        let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (i, &column_area) in layout.iter().enumerate() {
            self.render_column(f, column_area, i);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, index: usize) {
        let Some(board) = self.db.board(&self.board_id).ok() else {
            return;
        };
        let groups = tasks_by_column(board);
        let Some(group) = groups.get(index) else {
            return;
        };

        let is_selected = index == self.selected_column;
        let is_hover = self.drag.is_active() && index == self.hover_column;
        let dragging_this = matches!(
            self.drag.source(),
            Some(DragSource::Column { column_id }) if *column_id == group.column.id
        );
        let border_style = if is_hover {
            Style::default().fg(DROP_HOVER).add_modifier(Modifier::BOLD)
        } else if dragging_this {
            Style::default().fg(DRAGGED).add_modifier(Modifier::BOLD)
        } else if is_selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let title_style = if group.over_wip_limit() {
            Style::default().fg(OVER_LIMIT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(column_heading(group), title_style))
            .border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let cards = &self.columns[index].task_ids;
        if cards.is_empty() {
            return;
        }

        let card_height = 5;
        let available = inner.height as usize;
        let visible = (available / card_height).max(1);
        let mut offset = self.scroll_offsets[index];
        if is_selected {
            if self.selected_card < offset {
                offset = self.selected_card;
            } else if self.selected_card >= offset + visible {
                offset = self.selected_card + 1 - visible;
            }
            self.scroll_offsets[index] = offset;
        }

        let mut y = 0;
        let mut rendered = 0;
        for (card_index, task_id) in cards.iter().enumerate().skip(offset) {
            let Some(task) = board.task(task_id) else {
                continue;
            };
            if y + card_height > available {
                break;
            }
            let card_area = Rect {
                x: inner.x,
                y: inner.y + y as u16,
                width: inner.width,
                height: card_height as u16,
            };
            let dragged = matches!(
                self.drag.source(),
                Some(DragSource::Task { task_id: id, .. }) if id == task_id
            );
            render_card(f, card_area, task, is_selected && card_index == self.selected_card, dragged);
            y += card_height;
            rendered += 1;
        }

        if offset > 0 {
            let indicator = Paragraph::new(format!("▲ +{} above", offset)).style(Style::default().fg(Color::Cyan));
            f.render_widget(indicator, Rect { x: inner.x, y: inner.y, width: inner.width, height: 1 });
        }
        let remaining = cards.len().saturating_sub(offset + rendered);
        if remaining > 0 {
            let indicator = Paragraph::new(format!("▼ +{} below", remaining)).style(Style::default().fg(Color::Cyan));
            f.render_widget(
                indicator,
                Rect { x: inner.x, y: inner.y + inner.height.saturating_sub(1), width: inner.width, height: 1 },
            );
        }
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = match &self.mode {
            Mode::Filter => format!("Filter: {} | Enter to apply, Esc to clear", self.filter_text),
            Mode::Confirm(Pending::DeleteTask { title, .. }) => format!("Delete '{}'? (y/N)", title),
            Mode::Confirm(Pending::DeleteColumn { label, count, .. }) => {
                format!("Delete list '{}' and its {} task(s)? (y/N)", label, count)
            }
            _ if self.drag.is_active() => "Moving: Left/Right to choose a list, Enter to drop, Esc to cancel".to_string(),
            _ if !self.status_message.is_empty() => self.status_message.clone(),
            _ => {
                let total: usize = self.columns.iter().map(|c| c.task_ids.len()).sum();
                let filter = if self.filter_text.is_empty() {
                    String::new()
                } else {
                    format!(" [Filter: {}]", self.filter_text)
                };
                format!("Tasks: {}{} | h: Help", total, filter)
            }
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(ACCENT).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_task_detail_popup(&self, f: &mut Frame) {
        let (Some(task), Some(board)) = (self.selected_task(), self.board()) else {
            return;
        };
        let popup_area = centered(f.area(), 70, 70);
        f.render_widget(Clear, popup_area);

        let column = board.column(&task.status).map(|c| c.label.as_str()).unwrap_or("-");
        let lines = vec![
            Line::from(Span::styled(
                format!("{}  {}", short_id(&task.id), task.title),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("List:      {}", column)),
            Line::from(format!("Type:      {}", format_issue_type(task.issue_type))),
            Line::from(format!("Assignee:  {}", task.assignee.as_deref().unwrap_or("-"))),
            Line::from(format!(
                "Labels:    {}",
                if task.labels.is_empty() { "-".to_string() } else { task.labels.join(", ") }
            )),
            Line::from(format!("Created:   {}", task.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"))),
            Line::from(format!("Updated:   {}", task.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"))),
            Line::from(""),
            Line::from("Description:"),
            Line::from(task.description.as_deref().unwrap_or("-").to_string()),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Task Details (Enter to close)")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(Color::Black));
        f.render_widget(paragraph, popup_area);
    }

    /// Main event loop.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Case-insensitive match on title, labels and assignee.
fn task_matches(task: &Task, filter_lower: &str) -> bool {
    task.title.to_lowercase().contains(filter_lower)
        || task.labels.iter().any(|l| l.contains(filter_lower))
        || task.assignee.as_ref().is_some_and(|a| a.to_lowercase().contains(filter_lower))
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, middle, _] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .areas(area);
    let [_, center, _] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .areas(middle);
    center
}

fn render_card(f: &mut Frame, area: Rect, task: &Task, selected: bool, dragged: bool) {
    let style = if dragged {
        Style::default().bg(DRAGGED).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().bg(ACCENT).fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::DarkGray)
    };

    let width = area.width.saturating_sub(2) as usize;
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!(" {} ", format_issue_type(task.issue_type)),
            Style::default().bg(issue_type_color(task.issue_type)).fg(Color::White),
        ),
        Span::raw(format!(" {}", short_id(&task.id))),
    ])];

    // Up to two lines of word-wrapped title
    let mut current = String::new();
    let mut title_lines = Vec::new();
    for word in task.title.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            title_lines.push(std::mem::take(&mut current));
            current = word.to_string();
            if title_lines.len() >= 2 {
                break;
            }
        }
    }
    if !current.is_empty() && title_lines.len() < 2 {
        title_lines.push(current);
    }
    lines.extend(title_lines.into_iter().map(Line::from));

    let mut footer = task.assignee.clone().unwrap_or_else(|| "-".to_string());
    if !task.labels.is_empty() {
        footer.push_str(&format!(" | {}", task.labels.join(",")));
    }
    lines.push(Line::from(footer));

    let card = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .style(style)
        .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

fn render_input_popup(f: &mut Frame, title: &str, field: &InputField) {
    let area = f.area();
    let width = (area.width * 60 / 100).max(20).min(area.width);
    let popup = Rect::new(area.x + (area.width - width) / 2, (area.y + area.height / 2).saturating_sub(1), width, 3.min(area.height));
    f.render_widget(Clear, popup);
    let input = Paragraph::new(field.display()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} (Enter to save, Esc to cancel)", title))
            .border_style(Style::default().fg(ACCENT)),
    );
    f.render_widget(input, popup);
}
