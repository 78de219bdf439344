// Event handling for the TUI application

use crate::remote::{ActionOutcome, Snapshot};
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Cadence of the background incremental refresh
pub const AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// A fetch cycle finished; replaces the UI's snapshot wholesale
    SnapshotReady(Snapshot),

    /// One detail pane finished loading. Tagged with its target so
    /// late deliveries for a closed view are dropped.
    DetailContentLoaded {
        service: String,
        host: String,
        tab: usize,
        content: String,
    },

    /// A stop/restart finished (successfully or not)
    ActionCompleted(ActionOutcome),

    /// Periodic tick for refresh
    Tick,

    /// User input event
    Input(CrosstermEvent),

    /// Status message for user feedback
    StatusMessage(String),

    /// Error occurred
    Error(anyhow::Error),

    /// Request to quit
    Quit,
}

/// User actions derived from input events
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    MoveTop,
    MoveBottom,
    Select,
    GoBack,
    Refresh,
    StopService,
    RestartService,
    ConfirmAction,
    CancelAction,
    NextTab,
    PrevTab,
    ShowHelp,
    None,
}

/// Convert keyboard input to actions
pub fn key_event_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Navigation
        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => Action::MoveUp,
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => Action::MoveDown,
        (KeyCode::Char('g'), KeyModifiers::NONE) => Action::MoveTop,
        (KeyCode::Char('G'), KeyModifiers::SHIFT) => Action::MoveBottom,

        // Selection
        (KeyCode::Enter, _) => Action::Select,
        (KeyCode::Esc, _) => Action::GoBack,

        // Fleet operations
        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Refresh,
        (KeyCode::Char('s'), KeyModifiers::NONE) => Action::StopService,
        (KeyCode::Char('t'), KeyModifiers::NONE) => Action::RestartService,

        // Confirmation
        (KeyCode::Char('y'), KeyModifiers::NONE) => Action::ConfirmAction,
        (KeyCode::Char('n'), KeyModifiers::NONE) => Action::CancelAction,

        // Detail view tabs
        (KeyCode::Tab, _) | (KeyCode::Right, _) => Action::NextTab,
        (KeyCode::BackTab, _) | (KeyCode::Left, _) => Action::PrevTab,

        (KeyCode::Char('?'), KeyModifiers::NONE) => Action::ShowHelp,

        _ => Action::None,
    }
}

/// Spawn input event handler task
pub async fn spawn_input_handler(tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        loop {
            if crossterm::event::poll(Duration::from_millis(100)).unwrap_or(false) {
                if let Ok(event) = crossterm::event::read() {
                    if tx.send(AppEvent::Input(event)).await.is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Pausable periodic refresh timer.
///
/// The interval keeps ticking while paused and those ticks are
/// dropped, not deferred, so resuming picks the cadence back up
/// instead of firing a burst of missed refreshes.
pub struct RefreshTimer {
    paused: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    pub fn spawn(tx: mpsc::Sender<AppEvent>, interval: Duration) -> Self {
        let paused = Arc::new(AtomicBool::new(false));
        let gate = paused.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval fires immediately; the startup fetch covers that
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if gate.load(Ordering::Relaxed) {
                    continue;
                }
                if tx.send(AppEvent::Tick).await.is_err() {
                    break;
                }
            }
        });

        Self { paused, handle }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
