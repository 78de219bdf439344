// Per-host SSH connection handling

use crate::remote::models::Host;
use futures::future::join_all;
use openssh::{KnownHosts, Session, SessionBuilder};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Bound on each connection attempt
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

const TIMED_OUT: &str = "Connection timed out";

/// Connection state for one host. A host absent from the map is
/// disconnected (never attempted).
enum HostConnection {
    /// Live multiplexed session; shared by all concurrent commands
    Connected(Arc<Session>),
    Failed(String),
}

/// Owns one multiplexed SSH session per host.
///
/// The session store is keyed by host address and only reachable
/// through this API; state transitions happen wholesale (a handle is
/// stored, replaced, or removed, never partially mutated). The
/// underlying `openssh` session drives the native ssh client, which
/// supplies connection multiplexing and `~/.ssh/config` handling.
pub struct ConnectionManager {
    state: Mutex<HashMap<String, HostConnection>>,
    connect_timeout: Duration,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(CONNECT_TIMEOUT)
    }
}

impl ConnectionManager {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            connect_timeout,
        }
    }

    /// Connect to every host that does not already hold a live
    /// session. Returns one entry per requested host: `None` for
    /// already-connected hosts and fresh successes, `Some(reason)`
    /// for failures. All attempts run concurrently; no host's failure
    /// blocks another's success.
    pub async fn connect(&self, hosts: &[Host]) -> HashMap<String, Option<String>> {
        let to_attempt = {
            let state = self.state.lock().await;
            partition_unconnected(
                hosts,
                &state
                    .iter()
                    .filter(|(_, c)| matches!(c, HostConnection::Connected(_)))
                    .map(|(addr, _)| addr.clone())
                    .collect::<Vec<_>>(),
            )
        };

        let mut results: HashMap<String, Option<String>> = hosts
            .iter()
            .map(|h| (h.address.clone(), None))
            .collect();

        if to_attempt.is_empty() {
            return results;
        }

        tracing::info!("Connecting to {} host(s)", to_attempt.len());
        let attempts = join_all(to_attempt.iter().map(|addr| async move {
            (addr.clone(), self.connect_one(addr).await)
        }))
        .await;

        let mut state = self.state.lock().await;
        for (addr, outcome) in attempts {
            match outcome {
                Ok(session) => {
                    tracing::info!("Connected to {}", addr);
                    let previous = state
                        .insert(addr.clone(), HostConnection::Connected(Arc::new(session)));
                    if let Some(HostConnection::Connected(old)) = previous {
                        close_session(old).await;
                    }
                    results.insert(addr, None);
                }
                Err(reason) => {
                    tracing::warn!("Connection to {} failed: {}", addr, reason);
                    state.insert(addr.clone(), HostConnection::Failed(reason.clone()));
                    results.insert(addr, Some(reason));
                }
            }
        }

        results
    }

    /// One attempt with the user's ssh config (when present), bounded
    /// by the connect timeout. Timeouts fail immediately; any other
    /// failure is retried once with the client config suppressed,
    /// which defends against unparsable per-host config blocks.
    async fn connect_one(&self, addr: &str) -> Result<Session, String> {
        let user_config = user_ssh_config();

        match timeout(self.connect_timeout, open_session(addr, user_config.as_deref())).await {
            Err(_) => Err(TIMED_OUT.to_string()),
            Ok(Ok(session)) => Ok(session),
            Ok(Err(first_err)) => {
                tracing::debug!(
                    "Connection to {} failed ({}), retrying without ssh config",
                    addr,
                    first_err
                );
                match timeout(
                    self.connect_timeout,
                    open_session(addr, Some(Path::new("/dev/null"))),
                )
                .await
                {
                    Err(_) => Err(TIMED_OUT.to_string()),
                    Ok(Ok(session)) => Ok(session),
                    Ok(Err(retry_err)) => Err(retry_err.to_string()),
                }
            }
        }
    }

    /// Live session handle for a host, if connected
    pub async fn session(&self, host: &str) -> Option<Arc<Session>> {
        match self.state.lock().await.get(host) {
            Some(HostConnection::Connected(session)) => Some(session.clone()),
            _ => None,
        }
    }

    pub async fn is_connected(&self, host: &str) -> bool {
        matches!(
            self.state.lock().await.get(host),
            Some(HostConnection::Connected(_))
        )
    }

    /// Hosts currently in the failed state, candidates for reconnect
    pub async fn failed_hosts(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .iter()
            .filter_map(|(addr, conn)| match conn {
                HostConnection::Failed(_) => Some(addr.clone()),
                _ => None,
            })
            .collect()
    }

    /// Current connect errors, keyed by host address
    pub async fn connect_errors(&self) -> BTreeMap<String, String> {
        self.state
            .lock()
            .await
            .iter()
            .filter_map(|(addr, conn)| match conn {
                HostConnection::Failed(reason) => Some((addr.clone(), reason.clone())),
                _ => None,
            })
            .collect()
    }

    /// Close every live session and clear all state. Idempotent.
    pub async fn close(&self) {
        let drained: Vec<HostConnection> = {
            let mut state = self.state.lock().await;
            state.drain().map(|(_, conn)| conn).collect()
        };

        for conn in drained {
            if let HostConnection::Connected(session) = conn {
                close_session(session).await;
            }
        }
    }
}

/// Addresses from `hosts` that are not in `connected`, in input order.
/// Factored out so the additive-connect bookkeeping is testable
/// without opening sessions.
pub(crate) fn partition_unconnected(hosts: &[Host], connected: &[String]) -> Vec<String> {
    hosts
        .iter()
        .filter(|h| !connected.contains(&h.address))
        .map(|h| h.address.clone())
        .collect()
}

async fn open_session(addr: &str, config: Option<&Path>) -> Result<Session, openssh::Error> {
    let mut builder = SessionBuilder::default();
    builder.known_hosts_check(KnownHosts::Accept);
    if let Some(path) = config {
        builder.config_file(path);
    }
    builder.connect(addr).await
}

fn user_ssh_config() -> Option<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".ssh").join("config"))
        .filter(|path| path.exists())
}

/// Gracefully close when we hold the last reference; concurrent users
/// of the handle keep it alive and the drop impl cleans up after them.
async fn close_session(session: Arc<Session>) {
    if let Ok(session) = Arc::try_unwrap(session) {
        if let Err(e) = session.close().await {
            tracing::debug!("Error closing session: {}", e);
        }
    }
}
