//! # tf - TrackFlow kanban boards
//!
//! Manage kanban boards from the command line or an interactive terminal UI.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the board UI on the active board
//! tf ui
//!
//! # Add a task to the "To Do" column
//! tf task add "To Do" "Fix login redirect" --assignee "Sarah Chen" --label frontend
//!
//! # Move it along
//! tf task move "Fix login redirect" "In Progress"
//!
//! # Reorder columns: Done takes To Do's slot
//! tf column move Done --onto "To Do"
//!
//! # Counts per column and assignee
//! tf summary
//! ```
//!
//! Data is stored in `~/.trackflow/boards.json` (or the directory given with
//! `--dir` / `TRACKFLOW_DIR`). An optional `config.toml` in the same directory
//! sets the acting user, their role and the log filter.

use clap::Parser;

use trackflow::cli::Cli;
use trackflow::cmd::{run_command, Commands, Context};
use trackflow::config;
use trackflow::error::Result;
use trackflow::logging;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = config::resolve(cli.overrides())?;
    match cli.command {
        Commands::Ui => logging::init_to_file(&settings.log_filter, &settings.dir)?,
        _ => logging::init(&settings.log_filter)?,
    }
    tracing::debug!(dir = %settings.dir.display(), user = %settings.user.name, "settings resolved");

    let mut ctx = Context::open(settings, cli.board);
    run_command(&mut ctx, cli.command)
}
