use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::Overrides;
use crate::permissions::Role;

/// Kanban boards in the terminal.
/// Storage defaults to ~/.trackflow/boards.json or the directory passed via --dir.
#[derive(Parser)]
#[command(name = "tf", version, about = "Kanban board manager")]
pub struct Cli {
    /// Data directory holding boards.json and config.toml.
    #[arg(long, global = true, env = "TRACKFLOW_DIR")]
    pub dir: Option<PathBuf>,

    /// Board to act on (id, id prefix or name). Defaults to the active board.
    #[arg(long, short, global = true, env = "TRACKFLOW_BOARD")]
    pub board: Option<String>,

    /// Act as this user.
    #[arg(long, global = true, env = "TRACKFLOW_USER")]
    pub user: Option<String>,

    /// Role of the acting user.
    #[arg(long, value_enum, global = true, env = "TRACKFLOW_ROLE")]
    pub role: Option<Role>,

    /// Log filter, e.g. "info" or "trackflow=debug".
    #[arg(long, global = true, env = "TRACKFLOW_LOG")]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration values taken from flags and environment.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            dir: self.dir.clone(),
            user: self.user.clone(),
            role: self.role,
            log: self.log.clone(),
        }
    }
}
