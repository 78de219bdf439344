// Main application state and view routing

use crate::error::Result;
use crate::events::{key_event_to_action, Action, AppEvent, RefreshTimer};
use crate::remote::{Fleet, ResolvedService, ServiceAction, Snapshot, DEFAULT_JOURNAL_LINES};
use crate::ui::{DashboardAction, DashboardState, DetailAction, DetailState, HelpState};
use crossterm::event::Event as CrosstermEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Application views
#[derive(Debug)]
pub enum View {
    Dashboard(DashboardState),
    Detail(Box<DetailState>),
    Help(HelpState),
}

/// Main application state
pub struct App {
    pub view: View,
    pub should_quit: bool,
    pub fleet: Arc<Fleet>,
    pub tx: mpsc::Sender<AppEvent>,
    pub timer: RefreshTimer,
    pub status_message: Option<String>,
    pub needs_full_redraw: bool,
    /// Last published snapshot; seeds a rebuilt dashboard immediately
    snapshot: Snapshot,
    /// Guards against stacking refresh tasks on every tick
    refreshing: bool,
}

impl App {
    pub fn new(fleet: Arc<Fleet>, tx: mpsc::Sender<AppEvent>, timer: RefreshTimer) -> Self {
        Self {
            view: View::Dashboard(DashboardState::new()),
            should_quit: false,
            fleet,
            tx,
            timer,
            status_message: None,
            needs_full_redraw: true,
            snapshot: Snapshot::default(),
            refreshing: false,
        }
    }

    /// Kick off the startup full cycle (connect + resolve + fetch)
    pub fn start(&mut self) {
        self.spawn_full_cycle();
    }

    pub async fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Input(crossterm_event) => {
                self.handle_input(crossterm_event).await?;
            }
            AppEvent::SnapshotReady(snapshot) => {
                self.refreshing = false;
                self.snapshot = snapshot;
                if let View::Dashboard(dashboard) = &mut self.view {
                    dashboard.set_snapshot(self.fleet.hosts(), &self.snapshot);
                }
            }
            AppEvent::DetailContentLoaded {
                service,
                host,
                tab,
                content,
            } => {
                if let View::Detail(detail) = &mut self.view {
                    // Drop late deliveries for a view we already left
                    if detail.service.name == service && detail.host == host {
                        detail.set_content(tab, content);
                    }
                }
            }
            AppEvent::ActionCompleted(outcome) => {
                let prefix = if outcome.is_success() { "✓" } else { "✗" };
                self.status_message = Some(format!("{} {}", prefix, outcome.message()));
                tracing::info!("Action completed: {}", outcome.message());

                // Detail panes show pre-action output; reload them
                if let View::Detail(detail) = &self.view {
                    let resolved = detail.service.clone();
                    let host = detail.host.clone();
                    self.spawn_detail_fetches(&resolved, &host);
                }
            }
            AppEvent::Tick => {
                if matches!(self.view, View::Dashboard(_)) && !self.refreshing {
                    self.spawn_incremental_refresh();
                }
            }
            AppEvent::StatusMessage(message) => {
                self.status_message = Some(message.clone());
                tracing::info!("Status: {}", message);
            }
            AppEvent::Error(err) => {
                tracing::error!("Error: {}", err);
                self.status_message = Some(format!("✗ {}", err));
            }
            AppEvent::Quit => {
                self.should_quit = true;
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, event: CrosstermEvent) -> Result<()> {
        let CrosstermEvent::Key(key_event) = event else {
            return Ok(());
        };
        let action = key_event_to_action(key_event);

        // Quit and help are global, unless a confirmation modal wants
        // the key first or the help view is open (there, q and ? both
        // close help instead)
        if !self.modal_open() && !matches!(self.view, View::Help(_)) {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return Ok(());
                }
                Action::ShowHelp => {
                    self.needs_full_redraw = true;
                    self.view = View::Help(HelpState::new());
                    return Ok(());
                }
                _ => {}
            }
        }

        match &mut self.view {
            View::Dashboard(dashboard) => match dashboard.handle_action(action) {
                DashboardAction::OpenDetail { service, host } => {
                    self.open_detail(service, host).await;
                }
                DashboardAction::Execute {
                    action,
                    service,
                    host,
                } => {
                    self.spawn_action(action, service, host);
                }
                DashboardAction::Refresh => {
                    self.spawn_full_cycle();
                }
                DashboardAction::None => {}
            },
            View::Detail(detail) => match detail.handle_action(action) {
                DetailAction::GoBack => {
                    self.close_detail();
                }
                DetailAction::Execute {
                    action,
                    service,
                    host,
                } => {
                    self.spawn_action(action, service, host);
                }
                DetailAction::None => {}
            },
            View::Help(_) => {
                if matches!(action, Action::GoBack | Action::ShowHelp | Action::Quit) {
                    self.restore_dashboard();
                }
            }
        }

        Ok(())
    }

    fn modal_open(&self) -> bool {
        match &self.view {
            View::Dashboard(dashboard) => dashboard.pending.is_some(),
            View::Detail(detail) => detail.pending.is_some(),
            View::Help(_) => false,
        }
    }

    /// Switch to the detail view and fan out one fetch per pane. The
    /// refresh timer pauses while the view is open.
    async fn open_detail(&mut self, service: String, host: String) {
        let resolved = self
            .fleet
            .resolved_service(&host, &service)
            .await
            .unwrap_or_else(|| ResolvedService {
                name: service.clone(),
                files: Vec::new(),
                commands: Vec::new(),
            });

        self.timer.pause();
        self.status_message = None;
        self.needs_full_redraw = true;
        self.view = View::Detail(Box::new(DetailState::new(resolved.clone(), host.clone())));
        self.spawn_detail_fetches(&resolved, &host);
    }

    /// Back to the dashboard: resume the timer and refresh so the
    /// table reflects anything that changed while we were away
    fn close_detail(&mut self) {
        self.timer.resume();
        self.restore_dashboard();
        self.spawn_incremental_refresh();
    }

    fn restore_dashboard(&mut self) {
        self.status_message = None;
        self.needs_full_redraw = true;
        let mut dashboard = DashboardState::new();
        dashboard.set_snapshot(self.fleet.hosts(), &self.snapshot);
        self.view = View::Dashboard(dashboard);
    }

    fn spawn_detail_fetches(&self, resolved: &ResolvedService, host: &str) {
        let mut tab = 0;

        let fleet = self.fleet.clone();
        let tx = self.tx.clone();
        let service = resolved.name.clone();
        let host_owned = host.to_string();
        tokio::spawn(async move {
            let content = fleet
                .journal(&host_owned, &service, DEFAULT_JOURNAL_LINES)
                .await;
            tx.send(AppEvent::DetailContentLoaded {
                service,
                host: host_owned,
                tab: 0,
                content,
            })
            .await
            .ok();
        });

        for path in &resolved.files {
            tab += 1;
            let fleet = self.fleet.clone();
            let tx = self.tx.clone();
            let service = resolved.name.clone();
            let host_owned = host.to_string();
            let path = path.clone();
            tokio::spawn(async move {
                let content = fleet.read_file(&host_owned, &path).await;
                tx.send(AppEvent::DetailContentLoaded {
                    service,
                    host: host_owned,
                    tab,
                    content,
                })
                .await
                .ok();
            });
        }

        for command in &resolved.commands {
            tab += 1;
            let fleet = self.fleet.clone();
            let tx = self.tx.clone();
            let service = resolved.name.clone();
            let host_owned = host.to_string();
            let command = command.clone();
            tokio::spawn(async move {
                let content = fleet.run_command(&host_owned, &command).await;
                tx.send(AppEvent::DetailContentLoaded {
                    service,
                    host: host_owned,
                    tab,
                    content,
                })
                .await
                .ok();
            });
        }
    }

    fn spawn_action(&mut self, action: ServiceAction, service: String, host: String) {
        let fleet = self.fleet.clone();
        let tx = self.tx.clone();
        self.refreshing = true;
        tokio::spawn(async move {
            let (outcome, snapshot) = fleet.execute_action(action, &host, &service).await;
            tx.send(AppEvent::ActionCompleted(outcome)).await.ok();
            tx.send(AppEvent::SnapshotReady(snapshot)).await.ok();
        });
    }

    fn spawn_full_cycle(&mut self) {
        self.refreshing = true;
        if let View::Dashboard(dashboard) = &mut self.view {
            dashboard.loading = true;
        }
        let fleet = self.fleet.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let snapshot = fleet.connect_and_fetch().await;
            tx.send(AppEvent::SnapshotReady(snapshot)).await.ok();
        });
    }

    fn spawn_incremental_refresh(&mut self) {
        self.refreshing = true;
        let fleet = self.fleet.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let snapshot = fleet.refresh().await;
            tx.send(AppEvent::SnapshotReady(snapshot)).await.ok();
        });
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Reserve space for the status bar when a message is showing
        let (content_area, status_area) = if self.status_message.is_some() {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)])
                .split(area);
            (chunks[0], Some(chunks[1]))
        } else {
            (area, None)
        };

        let show_dashboard_footer = status_area.is_none();

        match &mut self.view {
            View::Dashboard(dashboard) => {
                dashboard.phase = self.fleet.phase();
                dashboard.loading = self.refreshing;
                dashboard.render(frame, content_area, show_dashboard_footer);
            }
            View::Detail(detail) => {
                detail.render(frame, content_area);
            }
            View::Help(help) => {
                help.render(frame, content_area);
            }
        }

        if let Some(status_area) = status_area {
            if let Some(message) = &self.status_message {
                use ratatui::text::{Line, Span};
                use ratatui::widgets::{Paragraph, Wrap};

                let (color, prefix) = if message.contains('✓') {
                    (ratatui::style::Color::Green, "✓")
                } else if message.contains('✗') {
                    (ratatui::style::Color::Red, "✗")
                } else {
                    (ratatui::style::Color::Yellow, "ℹ")
                };

                let status_line = Line::from(vec![
                    Span::styled(
                        prefix,
                        Style::default()
                            .fg(color)
                            .add_modifier(ratatui::style::Modifier::BOLD),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        message
                            .trim_start_matches("✓ ")
                            .trim_start_matches("✗ "),
                        Style::default().fg(color),
                    ),
                ]);

                let status_bar = Paragraph::new(status_line)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(" Status ")
                            .border_style(Style::default().fg(color)),
                    )
                    .wrap(Wrap { trim: true });

                frame.render_widget(status_bar, status_area);
            }
        }
    }
}
