// Remote host orchestration: connections, execution, resolution,
// status aggregation, actions

pub mod actions;
pub mod aggregator;
pub mod connection;
pub mod executor;
pub mod models;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use actions::{ActionOutcome, ServiceAction};
pub use aggregator::Fleet;
pub use connection::ConnectionManager;
pub use executor::{RemoteExecutor, DEFAULT_JOURNAL_LINES, DEFAULT_SESSION_LIMIT};
pub use models::{
    CyclePhase, ExecOutput, Host, ResolvedService, ServiceSpec, ServiceStatus, Snapshot,
};
pub use resolver::resolve_services;
