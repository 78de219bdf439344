// Fleet data models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// systemctl exit code for an inactive unit
pub const EXIT_INACTIVE: i32 = 3;
/// systemctl exit code for an unknown unit
pub const EXIT_NOT_FOUND: i32 = 4;

/// A remote host from the inventory. Identity is the address;
/// the group is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub address: String,
    pub group: String,
}

impl Host {
    pub fn new(address: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            group: group.into(),
        }
    }
}

/// A user-authored service entry from the services config. The name
/// may contain glob characters (`*`, `?`, `[`); files and commands
/// are inherited unchanged by every service the entry expands to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub commands: Vec<String>,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// True if the name is a pattern rather than an exact unit name
    pub fn is_pattern(&self) -> bool {
        self.name.contains(['*', '?', '['])
    }
}

/// A spec with a concrete (non-glob) name, produced by the resolver
/// for one host. Rebuilt whenever the host's unit inventory is
/// (re)discovered, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedService {
    pub name: String,
    pub files: Vec<String>,
    pub commands: Vec<String>,
}

impl ResolvedService {
    /// Concrete service inheriting files/commands from a spec entry
    pub fn from_spec(name: impl Into<String>, spec: &ServiceSpec) -> Self {
        Self {
            name: name.into(),
            files: spec.files.clone(),
            commands: spec.commands.clone(),
        }
    }
}

/// Captured output of one remote command
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    /// None when the command never ran (no connection, transport error)
    pub exit_code: Option<i32>,
}

impl ExecOutput {
    /// stdout with stderr appended as a delimited trailing section
    pub fn text(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n--- stderr ---\n{}", self.stdout, self.stderr)
        }
    }
}

/// Status of one resolved service on one host for one fetch cycle.
/// Never mutated after construction, only replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub service: String,
    pub host: String,
    pub active: bool,
    pub status_output: String,
    pub error: Option<String>,
    pub not_found: bool,
}

impl ServiceStatus {
    /// Interpret a `systemctl status` result: 0 = active, 3 = inactive,
    /// 4 = unit not found, anything else is an error.
    pub fn from_exit(service: &str, host: &str, output: &ExecOutput) -> Self {
        let mut status = Self {
            service: service.to_string(),
            host: host.to_string(),
            active: false,
            status_output: output.text(),
            error: None,
            not_found: false,
        };

        match output.exit_code {
            Some(0) => status.active = true,
            Some(EXIT_INACTIVE) => {}
            Some(EXIT_NOT_FOUND) => status.not_found = true,
            Some(code) => {
                let stderr = output.stderr.trim();
                status.error = Some(if stderr.is_empty() {
                    format!("systemctl exited with code {}", code)
                } else {
                    stderr.to_string()
                });
            }
            None => {
                let stderr = output.stderr.trim();
                status.error = Some(if stderr.is_empty() {
                    "remote execution failed".to_string()
                } else {
                    stderr.to_string()
                });
            }
        }

        status
    }

    /// Status for a transport-level failure (command never completed)
    pub fn from_error(service: &str, host: &str, error: impl Into<String>) -> Self {
        Self {
            service: service.to_string(),
            host: host.to_string(),
            active: false,
            status_output: String::new(),
            error: Some(error.into()),
            not_found: false,
        }
    }

    /// User-facing state label for table cells
    pub fn state_label(&self) -> String {
        if let Some(err) = &self.error {
            format!("⚠ {}", err)
        } else if self.not_found {
            "? not found".to_string()
        } else if self.active {
            "● active".to_string()
        } else {
            "○ inactive".to_string()
        }
    }
}

/// The UI-visible aggregate for one fetch cycle, published atomically.
///
/// Invariant: every inventory host appears either in `connect_errors`
/// or contributes zero-or-more `statuses` rows, never both.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub connect_errors: BTreeMap<String, String>,
    pub statuses: Vec<ServiceStatus>,
}

impl Snapshot {
    pub fn connect_error(&self, host: &str) -> Option<&str> {
        self.connect_errors.get(host).map(String::as_str)
    }

    pub fn statuses_for<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a ServiceStatus> {
        self.statuses.iter().filter(move |s| s.host == host)
    }

    pub fn find(&self, service: &str, host: &str) -> Option<&ServiceStatus> {
        self.statuses
            .iter()
            .find(|s| s.service == service && s.host == host)
    }
}

/// Phase of the current refresh cycle, for header display and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Connecting,
    Resolving,
    Fetching,
    Ready,
}

impl CyclePhase {
    pub fn label(&self) -> &'static str {
        match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Connecting => "connecting",
            CyclePhase::Resolving => "resolving",
            CyclePhase::Fetching => "fetching",
            CyclePhase::Ready => "ready",
        }
    }
}
