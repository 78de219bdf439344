// Services configuration loading

use crate::error::{FleetError, Result};
use crate::remote::ServiceSpec;
use serde_yaml::Value;
use std::path::Path;

/// Load the services YAML file into an ordered spec list.
///
/// Format:
///
/// ```yaml
/// services:
///   nginx:
///     files: [/etc/nginx/nginx.conf]
///     commands: ["nginx -t"]
///   web-*:        # glob, expanded per host against discovered units
/// ```
///
/// Document order of the mapping is preserved; it determines
/// resolution precedence when patterns overlap.
pub fn load_services(path: &Path) -> Result<Vec<ServiceSpec>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| FleetError::Config(format!("{}: {}", path.display(), e)))?;
    parse_services(&contents)
}

pub(crate) fn parse_services(yaml: &str) -> Result<Vec<ServiceSpec>> {
    let doc: Value =
        serde_yaml::from_str(yaml).map_err(|e| FleetError::Config(e.to_string()))?;

    let services = doc
        .get("services")
        .and_then(Value::as_mapping)
        .ok_or_else(|| FleetError::Config("missing 'services' mapping".to_string()))?;

    let mut specs = Vec::new();
    for (name, opts) in services {
        let name = name
            .as_str()
            .ok_or_else(|| FleetError::Config("service names must be strings".to_string()))?;

        specs.push(ServiceSpec {
            name: name.to_string(),
            files: string_list(opts, "files"),
            commands: string_list(opts, "commands"),
        });
    }

    Ok(specs)
}

/// Optional list of strings under `key`; a null entry body (bare
/// `name:`) yields empty lists
fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_sequence)
        .map(|seq| {
            seq.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
