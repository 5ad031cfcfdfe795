//! Command implementations for the CLI interface.
//!
//! Each handler checks the acting user's permission, resolves identifiers,
//! calls into the repository and saves the result. Destructive commands ask
//! for confirmation unless `--yes` is given.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};

use chrono::{Local, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::board::Board;
use crate::config::Settings;
use crate::db::{Database, STORAGE_KEY};
use crate::error::{Result, TrackflowError};
use crate::fields::{format_issue_type, is_known_label, IssueType, LABELS};
use crate::permissions::{authorize, Action, CurrentUser};
use crate::store::{create_backup, FileStore};
use crate::task::{Task, TaskFields, TaskPatch};
use crate::view::{
    board_summary, boards_with_assignee_tasks, column_heading, short_id, tasks_by_assignee,
    tasks_by_column, truncate,
};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive board interface.
    Ui,

    /// Manage boards.
    Board {
        #[command(subcommand)]
        action: BoardAction,
    },

    /// Manage the columns of a board.
    Column {
        #[command(subcommand)]
        action: ColumnAction,
    },

    /// Manage tasks on a board.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Show task counts for a board.
    Summary,

    /// List tasks assigned to a user across all boards.
    Assigned {
        /// Assignee name. Defaults to the acting user.
        name: Option<String>,
        /// List only the boards holding such tasks.
        #[arg(long)]
        boards: bool,
    },

    /// List the label vocabulary and label usage.
    Labels,

    /// Show the acting user and their permissions.
    Whoami,

    /// Export every board as JSON.
    Export {
        /// Output file path (default: stdout)
        #[arg(long, short)]
        output: Option<String>,
    },

    /// Create a timestamped backup of the board store.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Create a board with the standard columns and switch to it.
    Create { name: String },
    /// List boards.
    List,
    /// Show a board's columns and tasks.
    Show {
        /// Board to show. Defaults to --board or the active board.
        #[arg(value_name = "BOARD")]
        target: Option<String>,
        /// Show every board.
        #[arg(long, conflicts_with = "target")]
        all: bool,
    },
    /// Rename a board.
    Rename {
        #[arg(value_name = "BOARD")]
        target: String,
        name: String,
    },
    /// Make a board the active one.
    Use {
        #[arg(value_name = "BOARD")]
        target: String,
    },
    /// Delete a board and everything on it.
    Delete {
        #[arg(value_name = "BOARD")]
        target: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete every column and task on a board.
    Clear {
        #[arg(value_name = "BOARD")]
        target: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// Append a column.
    Add {
        label: String,
        /// Advisory work-in-progress limit.
        #[arg(long)]
        wip: Option<u32>,
    },
    /// Rename a column.
    Rename { column: String, label: String },
    /// Set or clear a column's advisory WIP limit.
    Wip {
        column: String,
        /// New limit. Omit to clear.
        limit: Option<u32>,
    },
    /// Delete a column and every task in it.
    Delete {
        column: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Move a column onto another column's slot, or to an index.
    Move {
        column: String,
        /// Column whose slot to take.
        #[arg(long, conflicts_with = "to", required_unless_present = "to")]
        onto: Option<String>,
        /// Zero-based position in the list without the moved column.
        #[arg(long)]
        to: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a column.
    Add {
        /// Column id or label.
        column: String,
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Assignee display name.
        #[arg(long)]
        assignee: Option<String>,
        /// Comma-separated labels. May be repeated.
        #[arg(long = "label")]
        labels: Vec<String>,
        /// Issue type: bug | feature | task.
        #[arg(long = "type", value_enum, default_value_t = IssueType::Task)]
        issue_type: IssueType,
    },
    /// Edit fields on a task.
    Edit {
        /// Task id, id prefix or title.
        task: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, conflicts_with = "clear_assignee")]
        assignee: Option<String>,
        /// Remove the assignee.
        #[arg(long)]
        clear_assignee: bool,
        /// Replace labels. May be repeated and comma-separated.
        #[arg(long = "label")]
        labels: Vec<String>,
        /// Remove all labels.
        #[arg(long, conflicts_with = "labels")]
        clear_labels: bool,
        #[arg(long = "type", value_enum)]
        issue_type: Option<IssueType>,
    },
    /// Move a task to another column.
    Move {
        task: String,
        /// Target column id or label.
        column: String,
    },
    /// Delete a task.
    Delete { task: String },
    /// Show a task's details.
    View { task: String },
}

/// Everything a command handler needs.
pub struct Context {
    pub settings: Settings,
    pub store: FileStore,
    pub db: Database,
    pub board: Option<String>,
}

impl Context {
    /// Open the store in the configured directory and load the repository.
    pub fn open(settings: Settings, board: Option<String>) -> Self {
        let store = FileStore::new(&settings.dir);
        let db = Database::load(&store);
        Context { settings, store, db, board }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.settings.user
    }

    fn authorize(&self, action: Action) -> Result<()> {
        authorize(&self.settings.user, action)
    }

    /// Board selected by --board, or the active board.
    pub fn target_board(&self) -> Result<String> {
        match &self.board {
            Some(ident) => self.db.resolve_board(ident),
            None => Ok(self.db.active_board_id()),
        }
    }

    fn save(&mut self) -> Result<()> {
        self.db.save(&mut self.store)
    }
}

/// Run a parsed command.
pub fn run_command(ctx: &mut Context, command: Commands) -> Result<()> {
    match command {
        Commands::Ui => crate::tui::board_run::run_board_tui(ctx),
        Commands::Board { action } => cmd_board(ctx, action),
        Commands::Column { action } => cmd_column(ctx, action),
        Commands::Task { action } => cmd_task(ctx, action),
        Commands::Summary => cmd_summary(ctx),
        Commands::Assigned { name, boards } => cmd_assigned(ctx, name, boards),
        Commands::Labels => cmd_labels(ctx),
        Commands::Whoami => cmd_whoami(ctx),
        Commands::Export { output } => cmd_export(ctx, output),
        Commands::Backup => cmd_backup(ctx),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Ask a yes/no question on stdin. Anything but "y" declines.
pub fn confirm(prompt: &str) -> bool {
    print!("{} (y/N): ", prompt);
    let _ = io::stdout().flush();
    let mut response = String::new();
    io::stdin().read_line(&mut response).is_ok() && response.trim().to_lowercase().starts_with('y')
}

pub fn cmd_board(ctx: &mut Context, action: BoardAction) -> Result<()> {
    match action {
        BoardAction::Create { name } => {
            ctx.authorize(Action::CreateBoard)?;
            let id = ctx.db.create_board(&name)?;
            ctx.save()?;
            println!("Created board {} ({})", name.trim(), short_id(&id));
        }
        BoardAction::List => {
            ctx.authorize(Action::ViewBoards)?;
            let active = ctx.db.active_board_id();
            println!("{:<2}{:<10} {:<24} {:>7} {:>5}", "", "ID", "Name", "Columns", "Tasks");
            for b in &ctx.db.boards {
                let marker = if b.id == active { "*" } else { "" };
                println!(
                    "{:<2}{:<10} {:<24} {:>7} {:>5}",
                    marker,
                    short_id(&b.id),
                    truncate(&b.name, 24),
                    b.columns.len(),
                    b.tasks.len()
                );
            }
        }
        BoardAction::Show { target, all } => {
            ctx.authorize(Action::ViewBoards)?;
            if all {
                for (i, b) in ctx.db.boards.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    print_board(b);
                }
                return Ok(());
            }
            let id = match target {
                Some(ident) => ctx.db.resolve_board(&ident)?,
                None => ctx.target_board()?,
            };
            print_board(ctx.db.board(&id)?);
        }
        BoardAction::Rename { target, name } => {
            ctx.authorize(Action::EditBoard)?;
            let id = ctx.db.resolve_board(&target)?;
            ctx.db.rename_board(&id, &name)?;
            ctx.save()?;
            println!("Renamed board {}", short_id(&id));
        }
        BoardAction::Use { target } => {
            ctx.authorize(Action::ViewBoards)?;
            let id = ctx.db.resolve_board(&target)?;
            ctx.db.set_active_board(&id)?;
            ctx.save()?;
            println!("Active board: {}", ctx.db.board(&id)?.name);
        }
        BoardAction::Delete { target, yes } => {
            ctx.authorize(Action::DeleteBoard)?;
            let id = ctx.db.resolve_board(&target)?;
            let name = ctx.db.board(&id)?.name.clone();
            if !yes && !confirm(&format!("Delete board '{}' and all its tasks?", name)) {
                println!("Cancelled.");
                return Ok(());
            }
            ctx.db.delete_board(&id)?;
            ctx.save()?;
            println!("Deleted board {}", name);
        }
        BoardAction::Clear { target, yes } => {
            ctx.authorize(Action::DeleteBoard)?;
            let id = ctx.db.resolve_board(&target)?;
            let name = ctx.db.board(&id)?.name.clone();
            if !yes && !confirm(&format!("Delete ALL lists and tasks in '{}'?", name)) {
                println!("Cancelled.");
                return Ok(());
            }
            ctx.db.clear_board(&id)?;
            ctx.save()?;
            println!("Cleared board {}", name);
        }
    }
    Ok(())
}

pub fn cmd_column(ctx: &mut Context, action: ColumnAction) -> Result<()> {
    ctx.authorize(Action::EditBoard)?;
    let board = ctx.target_board()?;
    match action {
        ColumnAction::Add { label, wip } => {
            let id = ctx.db.add_column(&board, &label, wip)?;
            ctx.save()?;
            println!("Added column {}", id);
        }
        ColumnAction::Rename { column, label } => {
            let id = ctx.db.resolve_column(&board, &column)?;
            ctx.db.rename_column(&board, &id, &label)?;
            ctx.save()?;
            println!("Renamed column {}", id);
        }
        ColumnAction::Wip { column, limit } => {
            let id = ctx.db.resolve_column(&board, &column)?;
            ctx.db.set_wip_limit(&board, &id, limit)?;
            ctx.save()?;
            match limit {
                Some(n) => println!("WIP limit for {} set to {}", id, n),
                None => println!("WIP limit for {} cleared", id),
            }
        }
        ColumnAction::Delete { column, yes } => {
            let id = ctx.db.resolve_column(&board, &column)?;
            let b = ctx.db.board(&board)?;
            let count = b.tasks_in(&id).count();
            let label = b.column(&id).map(|c| c.label.clone()).unwrap_or_default();
            if !yes && !confirm(&format!("Delete list '{}' and its {} task(s)?", label, count)) {
                println!("Cancelled.");
                return Ok(());
            }
            let removed = ctx.db.delete_column(&board, &id)?;
            ctx.save()?;
            println!("Deleted column {} and {} task(s)", label, removed);
        }
        ColumnAction::Move { column, onto, to } => {
            let id = ctx.db.resolve_column(&board, &column)?;
            let changed = match (onto, to) {
                (Some(target), _) => {
                    let target = ctx.db.resolve_column(&board, &target)?;
                    ctx.db.move_column_onto(&board, &id, &target)?
                }
                (None, Some(index)) => ctx.db.reorder_column(&board, &id, index)?,
                (None, None) => {
                    return Err(TrackflowError::Validation("either --onto or --to is required".into()))
                }
            };
            ctx.save()?;
            if changed {
                let order: Vec<&str> = ctx.db.board(&board)?.columns.iter().map(|c| c.label.as_str()).collect();
                println!("Column order: {}", order.join(" | "));
            } else {
                println!("Column order unchanged");
            }
        }
    }
    Ok(())
}

pub fn cmd_task(ctx: &mut Context, action: TaskAction) -> Result<()> {
    let board = ctx.target_board()?;
    match action {
        TaskAction::Add { column, title, desc, assignee, labels, issue_type } => {
            ctx.authorize(Action::EditTasks)?;
            let column = ctx.db.resolve_column(&board, &column)?;
            let fields = TaskFields { title, description: desc, assignee, labels, issue_type };
            let id = ctx.db.create_task(&board, &column, fields, Utc::now())?;
            ctx.save()?;
            println!("Added task {}", short_id(&id));
        }
        TaskAction::Edit { task, title, desc, assignee, clear_assignee, labels, clear_labels, issue_type } => {
            ctx.authorize(Action::EditTasks)?;
            let id = ctx.db.resolve_task(&board, &task)?;
            let patch = TaskPatch {
                title,
                description: desc.map(Some),
                assignee: if clear_assignee { Some(None) } else { assignee.map(Some) },
                labels: if clear_labels {
                    Some(Vec::new())
                } else if labels.is_empty() {
                    None
                } else {
                    Some(labels)
                },
                issue_type,
            };
            if patch.is_empty() {
                println!("Nothing to update.");
                return Ok(());
            }
            ctx.db.update_task(&board, &id, patch, Utc::now())?;
            ctx.save()?;
            println!("Updated task {}", short_id(&id));
        }
        TaskAction::Move { task, column } => {
            ctx.authorize(Action::EditTasks)?;
            let id = ctx.db.resolve_task(&board, &task)?;
            let target = ctx.db.resolve_column(&board, &column)?;
            match ctx.db.reassign_task_column(&board, &id, &target, Utc::now())? {
                Some(moved) => {
                    ctx.save()?;
                    println!("{}", moved);
                }
                None => println!("Task already in that column"),
            }
        }
        TaskAction::Delete { task } => {
            ctx.authorize(Action::EditTasks)?;
            // A task that is already gone is fine.
            let id = match ctx.db.resolve_task(&board, &task) {
                Ok(id) => id,
                Err(e) if e.is_not_found() => {
                    println!("Task {} already deleted", task);
                    return Ok(());
                }
                Err(e) => return Err(e),
            };
            if ctx.db.delete_task(&board, &id)? {
                ctx.save()?;
                println!("Deleted task {}", short_id(&id));
            }
        }
        TaskAction::View { task } => {
            ctx.authorize(Action::ViewBoards)?;
            let id = ctx.db.resolve_task(&board, &task)?;
            let b = ctx.db.board(&board)?;
            if let Some(t) = b.task(&id) {
                print_task(b, t);
            }
        }
    }
    Ok(())
}

/// Print task counts for the target board.
pub fn cmd_summary(ctx: &Context) -> Result<()> {
    ctx.authorize(Action::ViewSummary)?;
    let board = ctx.db.board(&ctx.target_board()?)?;
    let summary = board_summary(board);

    println!("{} - {} task(s)", board.name, summary.total);
    println!();
    println!("{:<24} {:>5} {:>5}", "Column", "Count", "WIP");
    for column in &board.columns {
        let count = summary.by_column.get(&column.id).copied().unwrap_or(0);
        let wip = column.wip_limit.map(|w| w.to_string()).unwrap_or_else(|| "-".into());
        let flag = if column.wip_limit.is_some_and(|w| count > w as usize) { " !" } else { "" };
        println!("{:<24} {:>5} {:>5}{}", truncate(&column.label, 24), count, wip, flag);
    }
    if !summary.by_assignee.is_empty() {
        println!();
        println!("{:<24} {:>5}", "Assignee", "Count");
        for (name, count) in &summary.by_assignee {
            println!("{:<24} {:>5}", truncate(name, 24), count);
        }
    }
    Ok(())
}

/// Print tasks assigned to someone, or the boards holding them.
pub fn cmd_assigned(ctx: &Context, name: Option<String>, boards_only: bool) -> Result<()> {
    ctx.authorize(Action::ViewBoards)?;
    let name = name.unwrap_or_else(|| ctx.user().name.clone());

    if boards_only {
        let boards = boards_with_assignee_tasks(&ctx.db.boards, &name);
        if boards.is_empty() {
            println!("No boards with tasks for {}", name);
        }
        for b in boards {
            println!("{:<10} {}", short_id(&b.id), b.name);
        }
        return Ok(());
    }

    let tasks = tasks_by_assignee(&ctx.db.boards, &name);
    if tasks.is_empty() {
        println!("No tasks assigned to {}", name);
        return Ok(());
    }
    println!("{:<10} {:<18} {:<16} {}", "ID", "Board", "Column", "Title");
    for item in tasks {
        let column = ctx
            .db
            .board(item.board_id)
            .ok()
            .and_then(|b| b.column(&item.task.status))
            .map(|c| c.label.as_str())
            .unwrap_or("-");
        println!(
            "{:<10} {:<18} {:<16} {}",
            short_id(&item.task.id),
            truncate(item.board_name, 18),
            truncate(column, 16),
            item.task.title
        );
    }
    Ok(())
}

/// List the label vocabulary with usage counts across all boards.
pub fn cmd_labels(ctx: &Context) -> Result<()> {
    ctx.authorize(Action::ViewBoards)?;
    let mut counts: BTreeMap<String, usize> = LABELS.iter().map(|l| (l.to_string(), 0)).collect();
    for board in &ctx.db.boards {
        for task in &board.tasks {
            for label in &task.labels {
                *counts.entry(label.clone()).or_default() += 1;
            }
        }
    }
    println!("{:<20} {}", "Label", "Count");
    for (label, count) in counts {
        let marker = if is_known_label(&label) { "" } else { " *" };
        println!("{:<20} {}{}", truncate(&label, 20), count, marker);
    }
    Ok(())
}

pub fn cmd_whoami(ctx: &Context) -> Result<()> {
    let user = ctx.user();
    println!("{} ({})", user.name, user.role.label());
    let perms: Vec<String> = user.role.permissions().iter().map(|p| p.to_string()).collect();
    println!("Permissions: {}", perms.join(", "));
    Ok(())
}

/// Write the whole repository as JSON to a file or stdout.
pub fn cmd_export(ctx: &Context, output: Option<String>) -> Result<()> {
    ctx.authorize(Action::Export)?;
    let json = ctx.db.to_json()?;
    match output {
        Some(path) => {
            fs::write(&path, json)?;
            println!("Exported {} board(s) to {}", ctx.db.boards.len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn cmd_backup(ctx: &Context) -> Result<()> {
    ctx.authorize(Action::Export)?;
    let path = create_backup(&ctx.store, STORAGE_KEY)?;
    println!("Backup created: {}", path.display());
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}

/// Print a board as one block per column.
pub fn print_board(board: &Board) {
    println!("{} ({})", board.name, short_id(&board.id));
    if board.columns.is_empty() {
        println!("  (no lists)");
        return;
    }
    for group in tasks_by_column(board) {
        let warn = if group.over_wip_limit() { "  [over WIP limit]" } else { "" };
        println!();
        println!("== {} [{}]{}", column_heading(&group), group.column.id, warn);
        for t in group.tasks {
            let assignee = t.assignee.as_deref().unwrap_or("-");
            let labels = if t.labels.is_empty() {
                String::new()
            } else {
                format!(" [{}]", t.labels.join(","))
            };
            println!(
                "  {:<10} {:<8} {:<14} {}{}",
                short_id(&t.id),
                format_issue_type(t.issue_type),
                truncate(assignee, 14),
                t.title,
                labels
            );
        }
    }
}

/// Print every field of a task.
pub fn print_task(board: &Board, t: &Task) {
    let column = board.column(&t.status).map(|c| c.label.as_str()).unwrap_or("-");
    println!("Task {}: {}", t.id, t.title);
    println!("Board:       {}", board.name);
    println!("Column:      {}", column);
    println!("Type:        {}", format_issue_type(t.issue_type));
    println!("Assignee:    {}", t.assignee.as_deref().unwrap_or("-"));
    println!("Labels:      {}", if t.labels.is_empty() { "-".to_string() } else { t.labels.join(", ") });
    println!("Created:     {}", t.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    println!("Updated:     {}", t.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    if let Some(desc) = &t.description {
        println!();
        println!("{}", desc);
    }
}
