//! Logging setup.
//!
//! CLI commands log to stderr. The TUI owns the terminal, so it logs to a
//! file in the data directory instead.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{Result, TrackflowError};

/// Log file used while the TUI is running.
pub const LOG_FILE: &str = "trackflow.log";

fn filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .map_err(|e| TrackflowError::Config(format!("invalid log filter '{}': {}", directives, e)))
}

fn already_installed(e: impl std::fmt::Display) -> TrackflowError {
    TrackflowError::Config(format!("logging already initialised: {}", e))
}

/// Install a subscriber writing to stderr.
pub fn init(directives: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(directives)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(already_installed)
}

/// Install a subscriber appending to `<dir>/trackflow.log`.
pub fn init_to_file(directives: &str, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter(directives)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(already_installed)
}
