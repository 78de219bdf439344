// Error types for sysfleet

use thiserror::Error;

/// Result type alias using anyhow::Error
pub type Result<T> = anyhow::Result<T>;

/// Sysfleet-specific error types
///
/// Remote-I/O failures are flattened into data (connect error maps,
/// `ServiceStatus.error` fields, notification text) rather than
/// propagated up to kill the session, so only the local load errors
/// are fatal and carry a typed variant.
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Inventory error: {0}")]
    Inventory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
