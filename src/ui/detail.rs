// Detail view - journal, files and command output for one service

use crate::events::Action;
use crate::remote::{ResolvedService, ServiceAction};
use crate::ui::{help_style, placeholder_style, title_style};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

/// One text pane: the journal tail, a configured file, or a
/// configured command's output
#[derive(Debug, Clone)]
pub struct DetailTab {
    pub title: String,
    pub content: Option<String>,
}

/// What the detail view asks the app to do after handling a key
#[derive(Debug, Clone, PartialEq)]
pub enum DetailAction {
    None,
    GoBack,
    Execute { action: ServiceAction, service: String, host: String },
}

#[derive(Debug)]
pub struct DetailState {
    pub service: ResolvedService,
    pub host: String,
    pub tabs: Vec<DetailTab>,
    pub active_tab: usize,
    pub scroll: u16,
    pub pending: Option<ServiceAction>,
}

impl DetailState {
    /// Tab layout: journal first, then one tab per configured file
    /// (basename label) and per configured command (first word label)
    pub fn new(service: ResolvedService, host: String) -> Self {
        let mut tabs = vec![DetailTab {
            title: "journal".to_string(),
            content: None,
        }];

        for path in &service.files {
            tabs.push(DetailTab {
                title: file_label(path),
                content: None,
            });
        }
        for command in &service.commands {
            tabs.push(DetailTab {
                title: command_label(command),
                content: None,
            });
        }

        Self {
            service,
            host,
            tabs,
            active_tab: 0,
            scroll: 0,
            pending: None,
        }
    }

    /// A fetch task delivered one pane's content
    pub fn set_content(&mut self, tab: usize, content: String) {
        if let Some(t) = self.tabs.get_mut(tab) {
            t.content = Some(content);
        }
    }

    pub fn handle_action(&mut self, action: Action) -> DetailAction {
        if let Some(pending) = self.pending {
            return match action {
                Action::ConfirmAction => {
                    self.pending = None;
                    DetailAction::Execute {
                        action: pending,
                        service: self.service.name.clone(),
                        host: self.host.clone(),
                    }
                }
                Action::CancelAction | Action::GoBack | Action::Quit => {
                    self.pending = None;
                    DetailAction::None
                }
                _ => DetailAction::None,
            };
        }

        match action {
            Action::GoBack => DetailAction::GoBack,
            Action::NextTab => {
                self.active_tab = (self.active_tab + 1) % self.tabs.len();
                self.scroll = 0;
                DetailAction::None
            }
            Action::PrevTab => {
                self.active_tab = (self.active_tab + self.tabs.len() - 1) % self.tabs.len();
                self.scroll = 0;
                DetailAction::None
            }
            Action::MoveUp => {
                self.scroll = self.scroll.saturating_sub(1);
                DetailAction::None
            }
            Action::MoveDown => {
                self.scroll = self.scroll.saturating_add(1);
                DetailAction::None
            }
            Action::MoveTop => {
                self.scroll = 0;
                DetailAction::None
            }
            Action::StopService => {
                self.pending = Some(ServiceAction::Stop);
                DetailAction::None
            }
            Action::RestartService => {
                self.pending = Some(ServiceAction::Restart);
                DetailAction::None
            }
            _ => DetailAction::None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title + tab bar
                Constraint::Min(0),    // Pane content
                Constraint::Length(1), // Help footer
            ])
            .split(area);

        let titles: Vec<Line> = self.tabs.iter().map(|t| Line::from(t.title.clone())).collect();
        let tabs = Tabs::new(titles)
            .select(self.active_tab)
            .highlight_style(
                Style::default()
                    .fg(ratatui::style::Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .title(format!(" {} @ {} ", self.service.name, self.host))
                    .title_style(title_style())
                    .borders(Borders::ALL),
            );
        frame.render_widget(tabs, chunks[0]);

        let pane = &self.tabs[self.active_tab];
        let content = match &pane.content {
            Some(text) => Paragraph::new(text.clone()).scroll((self.scroll, 0)),
            None => Paragraph::new("Loading…").style(placeholder_style()),
        };
        frame.render_widget(
            content.block(Block::default().borders(Borders::ALL)),
            chunks[1],
        );

        let help = Paragraph::new(
            "[Tab/←→] Switch pane | [↑↓/jk] Scroll | [s] Stop | [t] Restart | [Esc] Back",
        )
        .style(help_style())
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(help, chunks[2]);

        if self.pending.is_some() {
            self.render_confirmation(frame, area);
        }
    }

    fn render_confirmation(&self, frame: &mut Frame, area: Rect) {
        let Some(action) = self.pending else {
            return;
        };

        let width = 60.min(area.width.saturating_sub(4));
        let popup = Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + area.height / 2,
            width,
            height: 5,
        };

        frame.render_widget(Clear, popup);
        let dialog = Paragraph::new(vec![
            Line::from(format!(
                "{} {} on {}?",
                action.title(),
                self.service.name,
                self.host
            )),
            Line::from(""),
            Line::from("[y] Yes  /  [n] No"),
        ])
        .alignment(ratatui::layout::Alignment::Center)
        .block(
            Block::default()
                .title(" Confirm ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ratatui::style::Color::Magenta)),
        );
        frame.render_widget(dialog, popup);
    }
}

/// Basename of a configured file path, for the tab label
pub(crate) fn file_label(path: &str) -> String {
    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(path)
        .to_string()
}

/// First word of a configured command, for the tab label
pub(crate) fn command_label(command: &str) -> String {
    command
        .split_whitespace()
        .next()
        .unwrap_or("cmd")
        .to_string()
}
