//! TrackFlow: a kanban board store with drag-style reordering.
//!
//! The [`db::Database`] repository owns every board. [`drag`] holds the
//! reorder rules and the gesture session used by the UI, [`view`] the
//! read-only projections, and [`store`] the key-value persistence behind it.

pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod drag;
pub mod error;
pub mod fields;
pub mod logging;
pub mod permissions;
pub mod store;
pub mod task;
pub mod view;
pub mod tui {
    pub mod board_run;
    pub mod board_view;
    pub mod colors;
    pub mod input;
}
