//! Pure capability policy evaluation (no IO).
//!
//! Input: capslock findings, an origin package, the own-module prefix and a policy.
//! Output: the deduplicated mapping dependency -> capabilities that violate the policy,
//! and a report built from those mappings.

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod attribution;
pub mod baseline;
pub mod context;
pub mod error;
pub mod policy;
pub mod report;

mod engine;
mod fingerprint;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

use capguard_types::Capability;
use std::collections::{BTreeMap, BTreeSet};

/// Dependency package -> capabilities not permitted for it.
///
/// Keys and values are ordered sets, so a `(package, capability)` pair appears at most once
/// and iteration order is deterministic.
pub type ViolationSet = BTreeMap<String, BTreeSet<Capability>>;

pub use aggregate::aggregate;
pub use attribution::{attribute, package_of};
pub use context::{EvalContext, ExcludedPackages, StdlibSource};
pub use engine::{LocationResolver, Resolution, UnitViolations, build_report, is_test_package};
pub use error::ContractViolation;
