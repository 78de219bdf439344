// Dashboard view - fleet status table

use crate::events::Action;
use crate::remote::{CyclePhase, Host, ServiceAction, ServiceStatus, Snapshot};
use crate::ui::{
    help_style, placeholder_style, selected_style, status_style, title_style, unreachable_style,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

/// One table row. Unreachable hosts come first, then each reachable
/// host's resolved services in inventory order; a connected host
/// whose patterns matched nothing gets a placeholder row instead of
/// vanishing.
#[derive(Debug, Clone)]
pub enum FleetRow {
    Unreachable { host: String, error: String },
    Service(ServiceStatus),
    NoServices { host: String },
}

impl FleetRow {
    /// The (service, host) pair for rows that can be acted on
    pub fn target(&self) -> Option<(&str, &str)> {
        match self {
            FleetRow::Service(status) => Some((&status.service, &status.host)),
            _ => None,
        }
    }
}

/// Presentation ordering: unreachable hosts first, then reachable
/// hosts with their rows, all in inventory order
pub fn build_rows(hosts: &[Host], snapshot: &Snapshot) -> Vec<FleetRow> {
    let mut rows = Vec::new();

    for host in hosts {
        if let Some(error) = snapshot.connect_error(&host.address) {
            rows.push(FleetRow::Unreachable {
                host: host.address.clone(),
                error: error.to_string(),
            });
        }
    }

    for host in hosts {
        if snapshot.connect_error(&host.address).is_some() {
            continue;
        }
        let mut any = false;
        for status in snapshot.statuses_for(&host.address) {
            any = true;
            rows.push(FleetRow::Service(status.clone()));
        }
        if !any {
            rows.push(FleetRow::NoServices {
                host: host.address.clone(),
            });
        }
    }

    rows
}

/// A stop/restart awaiting its y/n confirmation
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub action: ServiceAction,
    pub service: String,
    pub host: String,
}

/// What the dashboard asks the app to do after handling a key
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    None,
    OpenDetail { service: String, host: String },
    Execute { action: ServiceAction, service: String, host: String },
    Refresh,
}

#[derive(Debug)]
pub struct DashboardState {
    pub rows: Vec<FleetRow>,
    pub table_state: TableState,
    pub loading: bool,
    pub phase: CyclePhase,
    pub pending: Option<PendingAction>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));

        Self {
            rows: Vec::new(),
            table_state,
            loading: true,
            phase: CyclePhase::Idle,
            pending: None,
        }
    }

    /// Replace the table contents from a freshly published snapshot
    pub fn set_snapshot(&mut self, hosts: &[Host], snapshot: &Snapshot) {
        self.rows = build_rows(hosts, snapshot);
        self.loading = false;
        self.phase = CyclePhase::Ready;

        // Keep the cursor in bounds across row-count changes
        if let Some(selected) = self.table_state.selected() {
            if selected >= self.rows.len() {
                self.table_state
                    .select(Some(self.rows.len().saturating_sub(1)));
            }
        } else if !self.rows.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    pub fn selected_row(&self) -> Option<&FleetRow> {
        self.table_state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn handle_action(&mut self, action: Action) -> DashboardAction {
        // Confirmation modal swallows everything except y/n/escape
        if let Some(pending) = self.pending.take() {
            return match action {
                Action::ConfirmAction => DashboardAction::Execute {
                    action: pending.action,
                    service: pending.service,
                    host: pending.host,
                },
                Action::CancelAction | Action::GoBack | Action::Quit => DashboardAction::None,
                _ => {
                    self.pending = Some(pending);
                    DashboardAction::None
                }
            };
        }

        match action {
            Action::MoveUp => {
                self.move_selection(-1);
                DashboardAction::None
            }
            Action::MoveDown => {
                self.move_selection(1);
                DashboardAction::None
            }
            Action::MoveTop => {
                self.table_state.select(Some(0));
                DashboardAction::None
            }
            Action::MoveBottom => {
                if !self.rows.is_empty() {
                    self.table_state.select(Some(self.rows.len() - 1));
                }
                DashboardAction::None
            }
            Action::Select => match self.selected_target() {
                Some((service, host)) => DashboardAction::OpenDetail { service, host },
                None => DashboardAction::None,
            },
            Action::StopService => {
                self.request_action(ServiceAction::Stop);
                DashboardAction::None
            }
            Action::RestartService => {
                self.request_action(ServiceAction::Restart);
                DashboardAction::None
            }
            Action::Refresh => {
                self.loading = true;
                DashboardAction::Refresh
            }
            _ => DashboardAction::None,
        }
    }

    fn selected_target(&self) -> Option<(String, String)> {
        self.selected_row()
            .and_then(FleetRow::target)
            .map(|(s, h)| (s.to_string(), h.to_string()))
    }

    fn request_action(&mut self, action: ServiceAction) {
        if let Some((service, host)) = self.selected_target() {
            self.pending = Some(PendingAction {
                action,
                service,
                host,
            });
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let new_index = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            (current + delta as usize).min(self.rows.len() - 1)
        };
        self.table_state.select(Some(new_index));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, show_footer: bool) {
        let constraints = if show_footer {
            vec![
                Constraint::Length(3), // Header
                Constraint::Length(3), // Stats
                Constraint::Min(0),    // Fleet table
                Constraint::Length(1), // Help footer
            ]
        } else {
            vec![
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ]
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.render_header(frame, chunks[0]);
        self.render_stats(frame, chunks[1]);
        self.render_table(frame, chunks[2]);
        if show_footer {
            self.render_help(frame, chunks[3]);
        }

        if self.pending.is_some() {
            self.render_confirmation(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        use crate::version;

        let build = version::build_info();
        let version_text = format!("v{}  ", build.version);

        let title = Paragraph::new("⚡ Sysfleet - Remote Systemd Service Monitor")
            .style(title_style())
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, area);

        // Version in the top-right corner, inside the border
        let version_area = Rect {
            x: area.x + area.width.saturating_sub(version_text.len() as u16 + 2),
            y: area.y + 1,
            width: version_text.len() as u16,
            height: 1,
        };
        let version_para = Paragraph::new(version_text).style(help_style());
        frame.render_widget(version_para, version_area);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let (unreachable, active, inactive, errors) = self.get_stats();
        let phase = if self.loading {
            format!(" | {}…", self.phase.label())
        } else {
            String::new()
        };

        let stats_text = format!(
            "Rows: {} | Active: {} | Inactive: {} | Errors: {} | Unreachable hosts: {}{}",
            self.rows.len(),
            active,
            inactive,
            errors,
            unreachable,
            phase
        );

        let stats = Paragraph::new(stats_text)
            .style(Style::default().fg(ratatui::style::Color::Yellow))
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(stats, area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| match row {
                FleetRow::Service(status) => Row::new(vec![
                    Cell::from(status.service.clone()),
                    Cell::from(status.host.clone()),
                    Cell::from(status.state_label()).style(status_style(status)),
                ]),
                FleetRow::Unreachable { host, error } => Row::new(vec![
                    Cell::from("—"),
                    Cell::from(host.clone()),
                    Cell::from(format!("⚠ unreachable: {}", error)).style(unreachable_style()),
                ]),
                FleetRow::NoServices { host } => Row::new(vec![
                    Cell::from("—"),
                    Cell::from(host.clone()),
                    Cell::from("no services").style(placeholder_style()),
                ]),
            })
            .collect();

        let widths = [
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Percentage(40),
        ];

        let title = if self.loading && self.rows.is_empty() {
            " Services (loading…) "
        } else {
            " Services "
        };

        let table = Table::new(rows, widths)
            .header(
                Row::new(vec!["Service", "Host", "Status"])
                    .style(
                        Style::default()
                            .bg(ratatui::style::Color::DarkGray)
                            .fg(ratatui::style::Color::White)
                            .add_modifier(Modifier::BOLD),
                    )
                    .bottom_margin(1),
            )
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(selected_style())
            .highlight_symbol(">> ");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help = Paragraph::new(
            "[Enter] Details | [↑↓/jk] Navigate | [r] Refresh | [s] Stop | [t] Restart | [?] Help | [q] Quit",
        )
        .style(help_style())
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(help, area);
    }

    fn render_confirmation(&self, frame: &mut Frame, area: Rect) {
        let Some(pending) = &self.pending else {
            return;
        };

        let width = 60.min(area.width.saturating_sub(4));
        let popup = Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + area.height / 2,
            width,
            height: 5,
        };

        let prompt = format!(
            "{} {} on {}?",
            pending.action.title(),
            pending.service,
            pending.host
        );

        frame.render_widget(Clear, popup);
        let dialog = Paragraph::new(vec![
            ratatui::text::Line::from(prompt),
            ratatui::text::Line::from(""),
            ratatui::text::Line::from("[y] Yes  /  [n] No"),
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

    /// (unreachable hosts, active, inactive, error rows)
    pub fn get_stats(&self) -> (usize, usize, usize, usize) {
        let mut unreachable = 0;
        let mut active = 0;
        let mut inactive = 0;
        let mut errors = 0;

        for row in &self.rows {
            match row {
                FleetRow::Unreachable { .. } => unreachable += 1,
                FleetRow::Service(status) => {
                    if status.error.is_some() {
                        errors += 1;
                    } else if status.active {
                        active += 1;
                    } else {
                        inactive += 1;
                    }
                }
                FleetRow::NoServices { .. } => {}
            }
        }

        (unreachable, active, inactive, errors)
    }
}
