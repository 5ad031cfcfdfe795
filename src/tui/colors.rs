//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::IssueType;

/// Board accent, used for the selected column and the status bar
pub const ACCENT: Color = Color::Rgb(0, 82, 155);
/// Column under the pointer while dragging
pub const DROP_HOVER: Color = Color::Rgb(0, 120, 60);
/// Column holding more tasks than its WIP limit
pub const OVER_LIMIT: Color = Color::Rgb(180, 40, 40);
/// Card picked up for a drag
pub const DRAGGED: Color = Color::Rgb(255, 215, 0);

pub const BUG: Color = Color::Rgb(114, 0, 0);
pub const FEATURE: Color = Color::Rgb(0, 80, 0);
pub const TASK: Color = Color::Rgb(86, 60, 92);

/// Card color for an issue type.
pub fn issue_type_color(t: IssueType) -> Color {
    match t {
        IssueType::Bug => BUG,
        IssueType::Feature => FEATURE,
        IssueType::Task => TASK,
    }
}
