//! Combine attribution, the allow-lists and the optional baseline into the final
//! violation mapping for one origin package.

use crate::ViolationSet;
use crate::attribution::attribute;
use crate::baseline::{build_snapshot, diff};
use crate::context::ExcludedPackages;
use crate::error::ContractViolation;
use crate::policy::Policy;
use capguard_types::CapabilityInfo;
use tracing::debug;

/// Violations of `policy` by the dependencies of `origin_package`.
///
/// Without a baseline every capability that is not permitted is a violation. With a
/// baseline only capabilities absent from the baseline are, and permitted ones are still
/// revoked. Every attributed dependency gets an entry, possibly empty.
pub fn aggregate(
    findings: &[CapabilityInfo],
    origin_package: &str,
    own_module_prefix: &str,
    policy: &Policy,
    excluded: &ExcludedPackages,
) -> Result<ViolationSet, ContractViolation> {
    let mut violations = match &policy.baseline {
        Some(baseline) => {
            let before = build_snapshot(baseline, origin_package, own_module_prefix)?;
            let now = build_snapshot(findings, origin_package, own_module_prefix)?;
            diff(&before, &now)
        }
        None => ViolationSet::new(),
    };

    for finding in findings {
        let Some(dependency) = attribute(finding, origin_package, own_module_prefix)? else {
            continue;
        };
        if excluded.contains(&dependency) {
            continue;
        }

        let capability = finding.capability;
        let permitted = policy.is_permitted(&dependency, capability);
        let entry = violations.entry(dependency).or_default();

        if permitted {
            entry.remove(&capability);
            continue;
        }

        // In baseline mode only the seeded (new) entries count.
        if policy.baseline.is_none() {
            entry.insert(capability);
        }
    }

    debug!(
        origin = origin_package,
        dependencies = violations.len(),
        "aggregated capability violations"
    );
    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{caps, direct, transitive, violations};
    use capguard_types::Capability;
    use std::collections::BTreeSet;

    fn files_via_dep() -> Vec<CapabilityInfo> {
        vec![transitive(Capability::Files, &["origin.Func", "dep.Get"])]
    }

    fn run(findings: &[CapabilityInfo], policy: &Policy) -> ViolationSet {
        aggregate(findings, "origin", "origin", policy, &ExcludedPackages::None)
            .expect("aggregate")
    }

    #[test]
    fn no_policy_reports_every_capability() {
        let out = run(&files_via_dep(), &Policy::default());
        assert_eq!(out, violations(&[("dep", &[Capability::Files])]));
    }

    #[test]
    fn global_allow_leaves_an_empty_entry() {
        let policy = Policy {
            global_allowed: caps(&[Capability::Files]),
            ..Policy::default()
        };
        let out = run(&files_via_dep(), &policy);
        assert_eq!(out, violations(&[("dep", &[])]));
    }

    #[test]
    fn package_allow_for_another_package_changes_nothing() {
        let policy = Policy {
            package_allowed: [("other".to_string(), caps(&[Capability::Files]))].into(),
            ..Policy::default()
        };
        let out = run(&files_via_dep(), &policy);
        assert_eq!(out, violations(&[("dep", &[Capability::Files])]));
    }

    #[test]
    fn package_allow_for_the_dependency_permits_it() {
        let policy = Policy {
            package_allowed: [("dep".to_string(), caps(&[Capability::Files]))].into(),
            ..Policy::default()
        };
        let out = run(&files_via_dep(), &policy);
        assert_eq!(out, violations(&[("dep", &[])]));
    }

    #[test]
    fn intra_module_calls_create_no_entry() {
        let findings = vec![transitive(
            Capability::Files,
            &["example.com/app.Func", "example.com/app/store.Open"],
        )];
        let out = aggregate(
            &findings,
            "example.com/app",
            "example.com/app",
            &Policy::default(),
            &ExcludedPackages::None,
        )
        .expect("aggregate");
        assert!(out.is_empty());
    }

    #[test]
    fn baseline_reports_only_new_capabilities() {
        let policy = Policy {
            baseline: Some(vec![transitive(Capability::Files, &["origin.Func", "dep.Get"])]),
            ..Policy::default()
        };
        let findings = vec![
            transitive(Capability::Files, &["origin.Func", "dep.Get"]),
            transitive(Capability::Network, &["origin.Func", "dep.Dial"]),
        ];
        let out = run(&findings, &policy);
        assert_eq!(out, violations(&[("dep", &[Capability::Network])]));
    }

    #[test]
    fn baseline_new_capability_is_revoked_when_permitted() {
        let policy = Policy {
            global_allowed: caps(&[Capability::Network]),
            baseline: Some(Vec::new()),
            ..Policy::default()
        };
        let findings = vec![
            transitive(Capability::Network, &["origin.Func", "dep.Dial"]),
            transitive(Capability::Files, &["origin.Func", "dep.Get"]),
        ];
        let out = run(&findings, &policy);
        assert_eq!(out, violations(&[("dep", &[Capability::Files])]));
    }

    #[test]
    fn baseline_only_packages_stay_as_empty_entries() {
        let policy = Policy {
            baseline: Some(vec![transitive(Capability::Files, &["origin.Func", "gone.Get"])]),
            ..Policy::default()
        };
        let out = run(&files_via_dep(), &policy);
        assert_eq!(
            out,
            violations(&[("dep", &[Capability::Files]), ("gone", &[])])
        );
    }

    #[test]
    fn excluded_packages_are_skipped_in_live_mode() {
        let findings = vec![
            transitive(Capability::Files, &["origin.Func", "os.Open"]),
            transitive(Capability::Network, &["origin.Func", "github.com/x/y.Get"]),
        ];
        let excluded = ExcludedPackages::ImportPathHeuristic;

        let live = aggregate(&findings, "origin", "origin", &Policy::default(), &excluded)
            .expect("aggregate");
        assert_eq!(live, violations(&[("github.com/x/y", &[Capability::Network])]));
    }

    #[test]
    fn baseline_seed_keeps_new_capabilities_of_excluded_packages() {
        let findings = vec![
            transitive(Capability::Files, &["origin.Func", "os.Open"]),
            transitive(Capability::Network, &["origin.Func", "github.com/x/y.Get"]),
        ];
        let policy = Policy {
            baseline: Some(Vec::new()),
            ..Policy::default()
        };
        let out = aggregate(
            &findings,
            "origin",
            "origin",
            &policy,
            &ExcludedPackages::ImportPathHeuristic,
        )
        .expect("aggregate");
        assert_eq!(
            out,
            violations(&[
                ("github.com/x/y", &[Capability::Network]),
                ("os", &[Capability::Files]),
            ])
        );
    }

    #[test]
    fn duplicate_paths_collapse_to_one_pair() {
        let findings = vec![
            transitive(Capability::Files, &["origin.A", "dep.Get", "os.Open"]),
            transitive(Capability::Files, &["origin.B", "(*dep.T).Read", "os.ReadFile"]),
            direct(Capability::Files, &["origin.A", "os.Open"]),
        ];
        let out = run(&findings, &Policy::default());
        assert_eq!(out["dep"], BTreeSet::from([Capability::Files]));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn short_path_aborts_without_partial_result() {
        let findings = vec![
            transitive(Capability::Files, &["origin.Func", "dep.Get"]),
            transitive(Capability::Network, &["origin.Func"]),
        ];
        let err = aggregate(
            &findings,
            "origin",
            "origin",
            &Policy::default(),
            &ExcludedPackages::None,
        );
        assert!(matches!(err, Err(ContractViolation::ShortPath { len: 1, .. })));
    }

    #[test]
    fn short_path_in_baseline_aborts_too() {
        let policy = Policy {
            baseline: Some(vec![transitive(Capability::Files, &["origin.Func"])]),
            ..Policy::default()
        };
        let err = aggregate(
            &files_via_dep(),
            "origin",
            "origin",
            &policy,
            &ExcludedPackages::None,
        );
        assert!(err.is_err());
    }
}
