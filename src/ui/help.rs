// Help view implementation

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug)]
pub struct HelpState;

impl Default for HelpState {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpState {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Content
                Constraint::Length(1), // Footer
            ])
            .split(area);

        let header = Paragraph::new("Sysfleet Help")
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let section = |name: &str| {
            Line::from(vec![
                Span::styled(
                    name.to_string(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::raw(": "),
            ])
        };

        let help_content = vec![
            section("Navigation"),
            Line::from("  ↑/↓ or j/k    - Move up/down in lists"),
            Line::from("  g/G           - Jump to top/bottom"),
            Line::from("  Enter         - Open service details"),
            Line::from("  Esc           - Go back"),
            Line::from(""),
            section("Fleet"),
            Line::from("  r             - Full refresh (reconnect + rediscover units)"),
            Line::from("  s             - Stop selected service (asks to confirm)"),
            Line::from("  t             - Restart selected service (asks to confirm)"),
            Line::from("  y/n           - Confirm / cancel a pending action"),
            Line::from(""),
            section("Detail view"),
            Line::from("  Tab / ←→      - Switch between journal, files and commands"),
            Line::from("  ↑/↓ or j/k    - Scroll pane content"),
            Line::from(""),
            section("Other"),
            Line::from("  ?             - This help"),
            Line::from("  q / Ctrl-C    - Quit"),
            Line::from(""),
            Line::from("Statuses refresh automatically every 30 seconds; the timer"),
            Line::from("pauses while a detail view is open. Unreachable hosts are"),
            Line::from("retried on every refresh."),
        ];

        let content = Paragraph::new(help_content)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        frame.render_widget(content, chunks[1]);

        let footer = Paragraph::new("Press Esc, ? or q to close")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(footer, chunks[2]);
    }
}
