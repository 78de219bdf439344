// Bounded remote command execution

use crate::remote::connection::ConnectionManager;
use crate::remote::models::{ExecOutput, ServiceStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

/// Max concurrent sessions per host; protects the remote sshd's
/// MaxSessions limit, not memory safety.
pub const DEFAULT_SESSION_LIMIT: usize = 8;

/// Default journal tail length
pub const DEFAULT_JOURNAL_LINES: usize = 200;

/// One concurrency limiter per host, created lazily
pub(crate) struct HostLimiters {
    slots: Mutex<HashMap<String, Arc<Semaphore>>>,
    capacity: usize,
}

impl HostLimiters {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    pub(crate) async fn limiter(&self, host: &str) -> Arc<Semaphore> {
        let mut slots = self.slots.lock().await;
        slots
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.capacity)))
            .clone()
    }
}

/// Runs remote commands over the shared per-host session, holding a
/// limiter slot for the lifetime of every remote round trip. The slot
/// is an RAII permit, so it is released on every exit path.
pub struct RemoteExecutor {
    connections: Arc<ConnectionManager>,
    limiters: HostLimiters,
}

impl RemoteExecutor {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self::with_limit(connections, DEFAULT_SESSION_LIMIT)
    }

    pub fn with_limit(connections: Arc<ConnectionManager>, limit: usize) -> Self {
        Self {
            connections,
            limiters: HostLimiters::new(limit),
        }
    }

    /// Run a shell command on a host, capturing stdout, stderr and the
    /// exit code. A missing connection yields a synthetic failure
    /// result immediately, without consuming a limiter slot.
    pub async fn run(&self, host: &str, command: &str) -> ExecOutput {
        let Some(session) = self.connections.session(host).await else {
            return ExecOutput {
                stdout: String::new(),
                stderr: format!("not connected to {}", host),
                exit_code: None,
            };
        };

        let limiter = self.limiters.limiter(host).await;
        let _permit = match limiter.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                // Semaphore closed only during teardown
                return ExecOutput {
                    stdout: String::new(),
                    stderr: format!("executor shut down for {}", host),
                    exit_code: None,
                };
            }
        };

        tracing::debug!("[{}] $ {}", host, command);
        match session.shell(command).output().await {
            Ok(output) => ExecOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            },
            Err(e) => {
                tracing::warn!("[{}] command failed: {}", host, e);
                ExecOutput {
                    stdout: String::new(),
                    stderr: e.to_string(),
                    exit_code: None,
                }
            }
        }
    }

    /// `systemctl status` probe, mapped through the 0/3/4 exit-code
    /// convention
    pub async fn status(&self, host: &str, service: &str) -> ServiceStatus {
        let output = self.run(host, &format!("systemctl status {}", service)).await;
        ServiceStatus::from_exit(service, host, &output)
    }

    /// Tail of the unit's journal
    pub async fn journal(&self, host: &str, service: &str, lines: usize) -> String {
        self.run(
            host,
            &format!("journalctl -u {} --no-pager -n {}", service, lines),
        )
        .await
        .text()
    }

    /// Read a remote file
    pub async fn read_file(&self, host: &str, path: &str) -> String {
        self.run(host, &format!("cat {}", path)).await.text()
    }

    /// Discover the host's service units, `.service` suffix stripped
    pub async fn list_units(&self, host: &str) -> Vec<String> {
        let output = self
            .run(
                host,
                "systemctl list-units --type=service --all --no-legend --no-pager",
            )
            .await;

        if output.exit_code != Some(0) {
            tracing::warn!(
                "Unit discovery on {} failed: {}",
                host,
                output.stderr.trim()
            );
            return Vec::new();
        }

        parse_unit_list(&output.stdout)
    }
}

/// Parse `systemctl list-units --no-legend` output: unit name is the
/// first column, with an optional state bullet in front of it for
/// failed units.
pub(crate) fn parse_unit_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let mut unit = parts.next()?;
            if unit == "●" || unit == "*" {
                unit = parts.next()?;
            }
            Some(unit.strip_suffix(".service").unwrap_or(unit).to_string())
        })
        .collect()
}
