// Ratatui styling and color palette

use crate::remote::ServiceStatus;
use ratatui::style::{Color, Modifier, Style};

// Color palette
pub const PRIMARY: Color = Color::Cyan;
pub const SUCCESS: Color = Color::Green;
pub const WARNING: Color = Color::Yellow;
pub const ERROR: Color = Color::Red;
pub const MUTED: Color = Color::Gray;

// Common styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn help_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

pub fn unreachable_style() -> Style {
    Style::default().fg(ERROR).add_modifier(Modifier::BOLD)
}

pub fn placeholder_style() -> Style {
    Style::default().fg(MUTED)
}

/// Style for a service status cell
pub fn status_style(status: &ServiceStatus) -> Style {
    if status.error.is_some() {
        Style::default().fg(ERROR).add_modifier(Modifier::BOLD)
    } else if status.not_found {
        Style::default().fg(WARNING)
    } else if status.active {
        Style::default().fg(SUCCESS).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(WARNING)
    }
}
