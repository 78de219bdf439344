// Ansible-style INI inventory loading

use crate::error::{FleetError, Result};
use crate::remote::Host;
use std::path::Path;

/// Load a grouped host inventory.
///
/// INI format: `[group]` headers, one host per line, `#`/`;`
/// comments. Only the first whitespace token of a host line is used
/// (trailing Ansible variables are ignored). Hosts before any group
/// header land in "ungrouped".
pub fn load_inventory(path: &Path) -> Result<Vec<Host>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| FleetError::Inventory(format!("{}: {}", path.display(), e)))?;
    Ok(parse_inventory(&contents))
}

pub(crate) fn parse_inventory(contents: &str) -> Vec<Host> {
    let mut hosts = Vec::new();
    let mut current_group = "ungrouped".to_string();

    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            if let Some(end) = rest.find(']') {
                current_group = rest[..end].to_string();
                continue;
            }
        }

        if let Some(address) = line.split_whitespace().next() {
            hosts.push(Host::new(address, current_group.clone()));
        }
    }

    hosts
}
