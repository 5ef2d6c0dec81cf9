//! Baseline differencing: which capabilities are new relative to a previous run.
//!
//! Both sides are re-attributed with the same origin and module prefix before comparing,
//! so intra-module calls and duplicate call paths never leak into the comparison.

use crate::ViolationSet;
use crate::attribution::attribute;
use crate::error::ContractViolation;
use capguard_types::{Capability, CapabilityInfo};
use std::collections::{BTreeMap, BTreeSet};

/// Dependency package -> capabilities observed for it.
pub type Snapshot = BTreeMap<String, BTreeSet<Capability>>;

pub fn build_snapshot(
    findings: &[CapabilityInfo],
    origin_package: &str,
    own_module_prefix: &str,
) -> Result<Snapshot, ContractViolation> {
    let mut snapshot = Snapshot::new();
    for finding in findings {
        let Some(dependency) = attribute(finding, origin_package, own_module_prefix)? else {
            continue;
        };
        snapshot
            .entry(dependency)
            .or_default()
            .insert(finding.capability);
    }
    Ok(snapshot)
}

/// `current \ baseline` per package, over the union of both key sets.
///
/// Packages only present in the baseline map to an empty set.
pub fn diff(baseline: &Snapshot, current: &Snapshot) -> ViolationSet {
    let packages: BTreeSet<&String> = baseline.keys().chain(current.keys()).collect();

    let empty = BTreeSet::new();
    packages
        .into_iter()
        .map(|package| {
            let before = baseline.get(package).unwrap_or(&empty);
            let new: BTreeSet<Capability> = current
                .get(package)
                .unwrap_or(&empty)
                .difference(before)
                .copied()
                .collect();
            (package.clone(), new)
        })
        .collect()
}
