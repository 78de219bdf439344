// Mutating service actions, serialized against the refresh cycle

use crate::remote::aggregator::Fleet;
use crate::remote::models::Snapshot;

/// The two supported mutating actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Stop,
    Restart,
}

impl ServiceAction {
    /// systemctl verb
    pub fn verb(&self) -> &'static str {
        match self {
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
        }
    }

    /// Capitalized form for prompts and error messages
    pub fn title(&self) -> &'static str {
        match self {
            ServiceAction::Stop => "Stop",
            ServiceAction::Restart => "Restart",
        }
    }

    /// Past tense for success notifications
    pub fn past_tense(&self) -> &'static str {
        match self {
            ServiceAction::Stop => "Stopped",
            ServiceAction::Restart => "Restarted",
        }
    }

    /// The privileged remote command, issued verbatim
    pub fn command(&self, service: &str) -> String {
        format!("sudo systemctl {} {}", self.verb(), service)
    }
}

/// Result of one action execution, carried back to the UI as a
/// transient notification
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub action: ServiceAction,
    pub service: String,
    pub host: String,
    pub error: Option<String>,
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn message(&self) -> String {
        match &self.error {
            None => format!(
                "{} {} on {}",
                self.action.past_tense(),
                self.service,
                self.host
            ),
            Some(err) => format!("{} {}: {}", self.action.title(), self.service, err),
        }
    }
}

impl Fleet {
    /// Run a stop/restart against one service on one host, then
    /// refresh so the displayed state reflects the post-action
    /// reality. The cycle lock is held across both steps: no other
    /// action or refresh interleaves with the sequence.
    ///
    /// systemd tooling does not reliably signal failure for these
    /// operations through the exit code alone, so the trimmed
    /// combined output is the success signal: empty means success,
    /// anything else is a human-readable error.
    pub async fn execute_action(
        &self,
        action: ServiceAction,
        host: &str,
        service: &str,
    ) -> (ActionOutcome, Snapshot) {
        let _cycle = self.cycle_lock.lock().await;

        tracing::info!("Executing {} of {} on {}", action.verb(), service, host);
        let output = self.executor.run(host, &action.command(service)).await;
        let mut text = output.stdout.trim().to_string();
        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr);
        }
        let error = (!text.is_empty()).then_some(text);

        if let Some(err) = &error {
            tracing::warn!("{} of {} on {} failed: {}", action.verb(), service, host, err);
        }

        let outcome = ActionOutcome {
            action,
            service: service.to_string(),
            host: host.to_string(),
            error,
        };

        // Post-action reality, fetched before any other work can slip in
        let snapshot = self.refresh_locked().await;
        (outcome, snapshot)
    }
}
