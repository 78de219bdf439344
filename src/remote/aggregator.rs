// Fleet-wide status aggregation: connect, resolve, fan out, publish

use crate::remote::connection::ConnectionManager;
use crate::remote::executor::RemoteExecutor;
use crate::remote::models::{CyclePhase, Host, ResolvedService, ServiceSpec, ServiceStatus, Snapshot};
use crate::remote::resolver::resolve_services;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The orchestration hub: owns the inventory, the service specs, the
/// connection store and the executor, and produces one `Snapshot` per
/// fetch cycle.
///
/// A cycle (full or incremental) runs under `cycle_lock`, which also
/// serializes mutating actions against the status-fetch phase so the
/// UI never shows stale state mid-mutation. Snapshots are built whole
/// and handed to the caller; the UI replaces its copy in one step, so
/// no partial snapshot is ever visible.
pub struct Fleet {
    hosts: Vec<Host>,
    specs: Vec<ServiceSpec>,
    pub(crate) connections: Arc<ConnectionManager>,
    pub(crate) executor: RemoteExecutor,
    resolved: Mutex<HashMap<String, Vec<ResolvedService>>>,
    phase: std::sync::Mutex<CyclePhase>,
    pub(crate) cycle_lock: Mutex<()>,
}

impl Fleet {
    pub fn new(hosts: Vec<Host>, specs: Vec<ServiceSpec>) -> Self {
        let connections = Arc::new(ConnectionManager::default());
        let executor = RemoteExecutor::new(connections.clone());

        Self {
            hosts,
            specs,
            connections,
            executor,
            resolved: Mutex::new(HashMap::new()),
            phase: std::sync::Mutex::new(CyclePhase::Idle),
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Phase of the cycle currently in flight, for the header line
    pub fn phase(&self) -> CyclePhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, phase: CyclePhase) {
        tracing::debug!("Cycle phase: {}", phase.label());
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }

    /// Full cycle: connect every inventory host, rediscover and
    /// re-resolve units on every connected host, fetch all statuses.
    /// Used on startup and manual refresh.
    pub async fn connect_and_fetch(&self) -> Snapshot {
        let _cycle = self.cycle_lock.lock().await;

        self.set_phase(CyclePhase::Connecting);
        let results = self.connections.connect(&self.hosts).await;

        self.set_phase(CyclePhase::Resolving);
        let connected: Vec<String> = results
            .iter()
            .filter(|(_, err)| err.is_none())
            .map(|(addr, _)| addr.clone())
            .collect();
        self.rebuild_resolved(&connected).await;

        self.fetch_statuses().await
    }

    /// Incremental refresh: only retry hosts currently in the failed
    /// state, re-resolve units only for hosts that came back, then
    /// re-fetch statuses for every connected host, since service state
    /// elsewhere may have changed too. Used by the timer, after
    /// actions, and when returning from the detail view.
    pub async fn refresh(&self) -> Snapshot {
        let _cycle = self.cycle_lock.lock().await;
        self.refresh_locked().await
    }

    /// Refresh body, caller already holds the cycle lock
    pub(crate) async fn refresh_locked(&self) -> Snapshot {
        self.set_phase(CyclePhase::Connecting);
        let failed: Vec<Host> = {
            let failed_addrs = self.connections.failed_hosts().await;
            self.hosts
                .iter()
                .filter(|h| failed_addrs.contains(&h.address))
                .cloned()
                .collect()
        };

        self.set_phase(CyclePhase::Resolving);
        if !failed.is_empty() {
            let results = self.connections.connect(&failed).await;
            let reconnected: Vec<String> = results
                .into_iter()
                .filter_map(|(addr, err)| err.is_none().then_some(addr))
                .collect();
            self.rebuild_resolved(&reconnected).await;
        }

        self.fetch_statuses().await
    }

    /// Rediscover units and re-resolve the configured specs on the
    /// given hosts, replacing their resolved lists wholesale
    async fn rebuild_resolved(&self, hosts: &[String]) {
        let discoveries = join_all(hosts.iter().map(|addr| async move {
            let units = self.executor.list_units(addr).await;
            (addr.clone(), resolve_services(&self.specs, &units))
        }))
        .await;

        let mut resolved = self.resolved.lock().await;
        for (addr, services) in discoveries {
            resolved.insert(addr, services);
        }
    }

    /// Fan out one status probe per (connected host, resolved service)
    /// pair and assemble the snapshot once every probe has resolved
    async fn fetch_statuses(&self) -> Snapshot {
        self.set_phase(CyclePhase::Fetching);

        let targets: Vec<(String, String)> = {
            let resolved = self.resolved.lock().await;
            let mut targets = Vec::new();
            for host in &self.hosts {
                if !self.connections.is_connected(&host.address).await {
                    continue;
                }
                if let Some(services) = resolved.get(&host.address) {
                    for service in services {
                        targets.push((host.address.clone(), service.name.clone()));
                    }
                }
            }
            targets
        };

        let statuses: Vec<ServiceStatus> = join_all(
            targets
                .iter()
                .map(|(host, service)| self.executor.status(host, service)),
        )
        .await;

        let snapshot = Snapshot {
            connect_errors: self.connections.connect_errors().await,
            statuses,
        };

        self.set_phase(CyclePhase::Ready);
        tracing::info!(
            "Cycle complete: {} status row(s), {} unreachable host(s)",
            snapshot.statuses.len(),
            snapshot.connect_errors.len()
        );
        snapshot
    }

    /// Resolved entry for a concrete (host, service) pair, used by the
    /// detail view to find the configured files and commands
    pub async fn resolved_service(&self, host: &str, service: &str) -> Option<ResolvedService> {
        self.resolved
            .lock()
            .await
            .get(host)
            .and_then(|services| services.iter().find(|s| s.name == service))
            .cloned()
    }

    /// Journal tail for the detail view
    pub async fn journal(&self, host: &str, service: &str, lines: usize) -> String {
        self.executor.journal(host, service, lines).await
    }

    /// Remote file contents for the detail view
    pub async fn read_file(&self, host: &str, path: &str) -> String {
        self.executor.read_file(host, path).await
    }

    /// Ad hoc configured command for the detail view
    pub async fn run_command(&self, host: &str, command: &str) -> String {
        self.executor.run(host, command).await.text()
    }

    /// Close every connection; safe to call more than once
    pub async fn close(&self) {
        self.connections.close().await;
    }
}
