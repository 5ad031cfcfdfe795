//! Board TUI entry point and terminal setup.

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::info;

use crate::cmd::Context;
use crate::error::Result;
use crate::permissions::{authorize, Action};
use crate::store::FileStore;
use crate::tui::board_view::BoardApp;

/// Initialise and run the board terminal user interface.
///
/// Opens on the board selected with `--board`, or the active board.
pub fn run_board_tui(ctx: &mut Context) -> Result<()> {
    authorize(ctx.user(), Action::ViewBoards)?;
    if ctx.board.is_some() {
        let id = ctx.target_board()?;
        ctx.db.set_active_board(&id)?;
    }
    info!(user = %ctx.user().name, board = %ctx.db.active_board_id(), "starting board ui");

    let store = Box::new(FileStore::new(ctx.store.dir()));
    let mut app = BoardApp::new(ctx.db.clone(), store, ctx.user().clone());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    ctx.db = app.into_db();
    result?;
    Ok(())
}
