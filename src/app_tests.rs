#[cfg(test)]
mod tests {
    use crate::app::*;
    use crate::error::Result;
    use crate::events::{key_event_to_action, Action, AppEvent, RefreshTimer};
    use crate::remote::{Fleet, Host, ServiceSpec, ServiceStatus, Snapshot};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn sample_fleet() -> Arc<Fleet> {
        let hosts = vec![Host::new("web1", "web"), Host::new("db1", "db")];
        let specs = vec![ServiceSpec::new("nginx"), ServiceSpec::new("postgresql")];
        Arc::new(Fleet::new(hosts, specs))
    }

    fn make_app() -> (App, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel(100);
        // Long interval so the timer never fires during a test
        let timer = RefreshTimer::spawn(tx.clone(), Duration::from_secs(3600));
        (App::new(sample_fleet(), tx, timer), rx)
    }

    fn sample_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot
            .connect_errors
            .insert("db1".to_string(), "Connection timed out".to_string());
        snapshot.statuses.push(ServiceStatus {
            service: "nginx".to_string(),
            host: "web1".to_string(),
            active: true,
            status_output: "running".to_string(),
            error: None,
            not_found: false,
        });
        snapshot
    }

    #[tokio::test]
    async fn test_app_creation() {
        let (app, _rx) = make_app();
        assert!(!app.should_quit);
        assert!(app.needs_full_redraw);
        assert!(matches!(app.view, View::Dashboard(_)));
    }

    #[tokio::test]
    async fn test_quit_event() -> Result<()> {
        let (mut app, _rx) = make_app();
        app.handle_event(AppEvent::Quit).await?;
        assert!(app.should_quit);
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_seeds_dashboard() -> Result<()> {
        let (mut app, _rx) = make_app();
        app.handle_event(AppEvent::SnapshotReady(sample_snapshot()))
            .await?;

        let View::Dashboard(dashboard) = &app.view else {
            panic!("expected dashboard view");
        };
        // One unreachable row for db1, one service row for web1
        assert_eq!(dashboard.rows.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_message_event() -> Result<()> {
        let (mut app, _rx) = make_app();
        app.handle_event(AppEvent::StatusMessage("hello".to_string()))
            .await?;
        assert_eq!(app.status_message.as_deref(), Some("hello"));
        Ok(())
    }

    #[tokio::test]
    async fn test_error_event_sets_status() -> Result<()> {
        let (mut app, _rx) = make_app();
        app.handle_event(AppEvent::Error(anyhow::anyhow!("boom")))
            .await?;
        let message = app.status_message.as_deref().unwrap();
        assert!(message.contains("boom"));
        assert!(message.contains('✗'));
        Ok(())
    }

    #[tokio::test]
    async fn test_help_view_round_trip() -> Result<()> {
        use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

        let (mut app, _rx) = make_app();
        app.handle_event(AppEvent::SnapshotReady(sample_snapshot()))
            .await?;

        app.handle_event(AppEvent::Input(Event::Key(KeyEvent::new(
            KeyCode::Char('?'),
            KeyModifiers::NONE,
        ))))
        .await?;
        assert!(matches!(app.view, View::Help(_)));

        app.handle_event(AppEvent::Input(Event::Key(KeyEvent::new(
            KeyCode::Esc,
            KeyModifiers::NONE,
        ))))
        .await?;
        let View::Dashboard(dashboard) = &app.view else {
            panic!("expected dashboard view");
        };
        // Rebuilt dashboard is reseeded from the held snapshot
        assert_eq!(dashboard.rows.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_help_closes_on_q_and_question_mark() -> Result<()> {
        use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

        let key = |code| AppEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));

        // q closes help, it must not quit the app
        let (mut app, _rx) = make_app();
        app.handle_event(key(KeyCode::Char('?'))).await?;
        assert!(matches!(app.view, View::Help(_)));
        app.handle_event(key(KeyCode::Char('q'))).await?;
        assert!(!app.should_quit);
        assert!(matches!(app.view, View::Dashboard(_)));

        // ? toggles help closed again
        app.handle_event(key(KeyCode::Char('?'))).await?;
        assert!(matches!(app.view, View::Help(_)));
        app.handle_event(key(KeyCode::Char('?'))).await?;
        assert!(matches!(app.view, View::Dashboard(_)));

        // q from the dashboard still quits
        app.handle_event(key(KeyCode::Char('q'))).await?;
        assert!(app.should_quit);
        Ok(())
    }

    #[tokio::test]
    async fn test_late_detail_content_is_ignored() -> Result<()> {
        // Content for a detail view we never opened must not panic
        // or disturb the dashboard
        let (mut app, _rx) = make_app();
        app.handle_event(AppEvent::DetailContentLoaded {
            service: "nginx".to_string(),
            host: "web1".to_string(),
            tab: 0,
            content: "journal output".to_string(),
        })
        .await?;
        assert!(matches!(app.view, View::Dashboard(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_action_outcome_sets_status() -> Result<()> {
        use crate::remote::{ActionOutcome, ServiceAction};

        let (mut app, _rx) = make_app();
        let outcome = ActionOutcome {
            action: ServiceAction::Restart,
            service: "nginx".to_string(),
            host: "web1".to_string(),
            error: None,
        };
        app.handle_event(AppEvent::ActionCompleted(outcome)).await?;
        let message = app.status_message.as_deref().unwrap();
        assert!(message.contains('✓'));
        assert!(message.contains("Restarted nginx on web1"));
        Ok(())
    }

    #[test]
    fn test_action_conversions() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        // Quit
        let quit_action =
            key_event_to_action(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(quit_action, Action::Quit);

        let ctrl_c_action =
            key_event_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(ctrl_c_action, Action::Quit);

        // Navigation
        let up_action = key_event_to_action(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE));
        assert_eq!(up_action, Action::MoveUp);

        let k_action = key_event_to_action(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE));
        assert_eq!(k_action, Action::MoveUp);

        let down_action = key_event_to_action(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        assert_eq!(down_action, Action::MoveDown);

        let j_action = key_event_to_action(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE));
        assert_eq!(j_action, Action::MoveDown);

        let top_action = key_event_to_action(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE));
        assert_eq!(top_action, Action::MoveTop);

        let bottom_action =
            key_event_to_action(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT));
        assert_eq!(bottom_action, Action::MoveBottom);

        // Selection and view control
        let select_action = key_event_to_action(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(select_action, Action::Select);

        let back_action = key_event_to_action(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(back_action, Action::GoBack);

        let refresh_action =
            key_event_to_action(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE));
        assert_eq!(refresh_action, Action::Refresh);

        // Service actions and confirmation
        let stop_action =
            key_event_to_action(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE));
        assert_eq!(stop_action, Action::StopService);

        let restart_action =
            key_event_to_action(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::NONE));
        assert_eq!(restart_action, Action::RestartService);

        let confirm_action =
            key_event_to_action(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE));
        assert_eq!(confirm_action, Action::ConfirmAction);

        let cancel_action =
            key_event_to_action(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE));
        assert_eq!(cancel_action, Action::CancelAction);

        // Tabs
        let next_tab = key_event_to_action(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(next_tab, Action::NextTab);

        let prev_tab = key_event_to_action(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(prev_tab, Action::PrevTab);

        // Help
        let help_action =
            key_event_to_action(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE));
        assert_eq!(help_action, Action::ShowHelp);

        // Unknown keys map to None
        let none_action =
            key_event_to_action(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE));
        assert_eq!(none_action, Action::None);
    }
}
