// Glob expansion of service specs against a host's discovered units

use crate::remote::models::{ResolvedService, ServiceSpec};
use glob::Pattern;
use std::collections::HashSet;

/// Expand service specs against the units discovered on a host.
///
/// Specs are processed in input order. Pattern entries produce one
/// `ResolvedService` per matching unit, in `available` order,
/// inheriting the entry's files and commands. Exact names pass
/// through unconditionally: the operator may reference services not
/// yet installed on the host; those surface as "not found" after the
/// live status check rather than being filtered out here.
///
/// A concrete name is emitted at most once: the first spec to produce
/// it wins, later matches are dropped. Pure function, no I/O.
pub fn resolve_services(specs: &[ServiceSpec], available: &[String]) -> Vec<ResolvedService> {
    let mut resolved = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for spec in specs {
        if spec.is_pattern() {
            let pattern = match Pattern::new(&spec.name) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("Invalid service pattern '{}': {}", spec.name, e);
                    continue;
                }
            };

            let matches: Vec<&String> =
                available.iter().filter(|s| pattern.matches(s)).collect();
            tracing::info!(
                "Pattern '{}' matched {} service(s): {:?}",
                spec.name,
                matches.len(),
                matches
            );

            for name in matches {
                if seen.insert(name.clone()) {
                    resolved.push(ResolvedService::from_spec(name, spec));
                }
            }
        } else if seen.insert(spec.name.clone()) {
            resolved.push(ResolvedService::from_spec(&spec.name, spec));
        }
    }

    resolved
}
