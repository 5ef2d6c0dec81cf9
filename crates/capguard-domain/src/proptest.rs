//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - attribution of direct and malformed findings
//! - allow-list evaluation
//! - baseline differencing
//! - determinism and monotonicity of the aggregate

use crate::aggregate::aggregate;
use crate::attribution::attribute;
use crate::baseline::{Snapshot, build_snapshot, diff};
use crate::context::ExcludedPackages;
use crate::policy::Policy;
use crate::test_support::{direct, transitive};
use capguard_types::{Capability, CapabilityInfo, CapabilityType, Function};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const ORIGIN: &str = "example.com/app/cmd";
const PREFIX: &str = "example.com/app";

// ============================================================================
// Strategies
// ============================================================================

fn arb_capability() -> impl Strategy<Value = Capability> {
    prop::sample::select(Capability::ALL.to_vec())
}

fn arb_package() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        ORIGIN,
        "example.com/app/internal/store",
        "github.com/google/uuid",
        "golang.org/x/sys/unix",
        "github.com/acme/net",
        "os",
        "net/http",
    ])
}

/// Plain functions and both method receiver forms.
fn arb_symbol() -> impl Strategy<Value = String> {
    (arb_package(), 0usize..3, "[A-Z][a-z]{0,6}").prop_map(|(pkg, form, name)| match form {
        0 => format!("{pkg}.{name}"),
        1 => format!("(*{pkg}.T).{name}"),
        _ => format!("({pkg}.T).{name}"),
    })
}

fn arb_kind() -> impl Strategy<Value = CapabilityType> {
    prop_oneof![
        3 => Just(CapabilityType::Transitive),
        1 => Just(CapabilityType::Direct),
        1 => Just(CapabilityType::Unspecified),
    ]
}

/// Well-formed findings: transitive ones always have at least two path elements.
fn arb_finding() -> impl Strategy<Value = CapabilityInfo> {
    (
        arb_capability(),
        arb_kind(),
        prop::collection::vec(arb_symbol(), 2..5),
        prop::bool::ANY,
    )
        .prop_map(|(capability, kind, mut path, from_origin)| {
            if from_origin {
                path[0] = format!("{ORIGIN}.run");
            }
            CapabilityInfo {
                capability,
                capability_type: kind,
                path: path.into_iter().map(Function::named).collect(),
                ..CapabilityInfo::default()
            }
        })
}

fn arb_findings() -> impl Strategy<Value = Vec<CapabilityInfo>> {
    prop::collection::vec(arb_finding(), 0..24)
}

fn arb_capability_set() -> impl Strategy<Value = BTreeSet<Capability>> {
    prop::collection::btree_set(arb_capability(), 0..5)
}

fn arb_policy() -> impl Strategy<Value = Policy> {
    (
        arb_capability_set(),
        prop::collection::btree_map(
            arb_package().prop_map(str::to_string),
            arb_capability_set(),
            0..4,
        ),
    )
        .prop_map(|(global_allowed, package_allowed)| Policy {
            global_allowed,
            package_allowed,
            baseline: None,
        })
}

fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    prop::collection::btree_map(
        arb_package().prop_map(str::to_string),
        arb_capability_set(),
        0..6,
    )
}

fn is_subset_by_key(
    smaller: &BTreeMap<String, BTreeSet<Capability>>,
    larger: &BTreeMap<String, BTreeSet<Capability>>,
) -> bool {
    smaller.iter().all(|(pkg, caps)| {
        larger
            .get(pkg)
            .is_some_and(|other| caps.is_subset(other))
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn non_transitive_findings_are_never_attributed(
        capability in arb_capability(),
        path in prop::collection::vec(arb_symbol(), 0..4),
    ) {
        let names: Vec<&str> = path.iter().map(String::as_str).collect();
        let finding = direct(capability, &names);
        prop_assert_eq!(attribute(&finding, ORIGIN, PREFIX), Ok(None));
    }

    #[test]
    fn short_transitive_paths_abort_aggregation(
        findings in arb_findings(),
        capability in arb_capability(),
        short in prop::collection::vec(arb_symbol(), 0..2),
        at in 0usize..24,
    ) {
        let names: Vec<&str> = short.iter().map(String::as_str).collect();
        let mut findings = findings;
        let at = at.min(findings.len());
        findings.insert(at, transitive(capability, &names));

        let result = aggregate(&findings, ORIGIN, PREFIX, &Policy::default(), &ExcludedPackages::None);
        prop_assert!(result.is_err());
    }

    #[test]
    fn global_allow_permits_every_package(
        policy in arb_policy(),
        capability in arb_capability(),
        package in arb_package(),
    ) {
        let mut policy = policy;
        policy.global_allowed.insert(capability);
        prop_assert!(policy.is_permitted(package, capability));
    }

    #[test]
    fn permission_is_the_union_of_both_lists(
        policy in arb_policy(),
        capability in arb_capability(),
        package in arb_package(),
    ) {
        let by_package = policy
            .package_allowed
            .get(package)
            .is_some_and(|caps| caps.contains(&capability));
        let global = policy.global_allowed.contains(&capability);
        prop_assert_eq!(policy.is_permitted(package, capability), by_package || global);
        prop_assert_eq!(policy.is_permitted(package, capability), global || by_package);
    }

    #[test]
    fn aggregate_is_idempotent(findings in arb_findings(), policy in arb_policy()) {
        let a = aggregate(&findings, ORIGIN, PREFIX, &policy, &ExcludedPackages::ImportPathHeuristic);
        let b = aggregate(&findings, ORIGIN, PREFIX, &policy, &ExcludedPackages::ImportPathHeuristic);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn self_diff_is_empty(snapshot in arb_snapshot()) {
        let out = diff(&snapshot, &snapshot);
        prop_assert!(out.values().all(BTreeSet::is_empty));
        prop_assert_eq!(out.len(), snapshot.len());
    }

    #[test]
    fn diff_never_reports_baseline_capabilities(
        baseline in arb_snapshot(),
        current in arb_snapshot(),
    ) {
        let out = diff(&baseline, &current);
        for (package, caps) in out.iter().filter(|(_, caps)| !caps.is_empty()) {
            prop_assert!(current.get(package).is_some_and(|now| caps.is_subset(now)));
        }
        for (package, caps) in &out {
            if let Some(before) = baseline.get(package) {
                prop_assert!(caps.is_disjoint(before));
            }
        }
    }

    #[test]
    fn widening_the_global_allow_list_never_adds_violations(
        findings in arb_findings(),
        policy in arb_policy(),
        extra in arb_capability(),
    ) {
        let before = aggregate(&findings, ORIGIN, PREFIX, &policy, &ExcludedPackages::None)
            .expect("well-formed findings");

        let mut wider = policy.clone();
        wider.global_allowed.insert(extra);
        let after = aggregate(&findings, ORIGIN, PREFIX, &wider, &ExcludedPackages::None)
            .expect("well-formed findings");

        prop_assert!(is_subset_by_key(&after, &before));
        prop_assert!(after.values().all(|caps| !caps.contains(&extra)));
    }

    #[test]
    fn current_run_as_baseline_reports_nothing(findings in arb_findings(), policy in arb_policy()) {
        let mut policy = policy;
        policy.baseline = Some(findings.clone());
        let out = aggregate(&findings, ORIGIN, PREFIX, &policy, &ExcludedPackages::None)
            .expect("well-formed findings");
        prop_assert!(out.values().all(BTreeSet::is_empty));
    }

    #[test]
    fn every_violation_is_backed_by_an_attributed_finding(
        findings in arb_findings(),
        policy in arb_policy(),
    ) {
        let out = aggregate(&findings, ORIGIN, PREFIX, &policy, &ExcludedPackages::None)
            .expect("well-formed findings");
        let snapshot = build_snapshot(&findings, ORIGIN, PREFIX).expect("snapshot");
        prop_assert!(is_subset_by_key(&out, &snapshot));
        for (package, caps) in &out {
            prop_assert!(!package.starts_with(PREFIX));
            for cap in caps {
                prop_assert!(!policy.is_permitted(package, *cap));
            }
        }
    }
}
