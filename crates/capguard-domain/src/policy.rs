use capguard_types::{Capability, CapabilityInfo, Mode, Severity};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailOn {
    Error,
    Warning,
}

/// Which capabilities dependencies may use, and what counts as already known.
#[derive(Clone, Debug, Default)]
pub struct Policy {
    /// Permitted for every dependency.
    pub global_allowed: BTreeSet<Capability>,
    /// Permitted for one dependency package only.
    pub package_allowed: BTreeMap<String, BTreeSet<Capability>>,
    /// Findings of a previous capslock run. When set, only capabilities missing from it
    /// are reported.
    pub baseline: Option<Vec<CapabilityInfo>>,
}

impl Policy {
    pub fn is_permitted(&self, dependency: &str, capability: Capability) -> bool {
        self.global_allowed.contains(&capability)
            || self
                .package_allowed
                .get(dependency)
                .is_some_and(|caps| caps.contains(&capability))
    }

    pub fn mode(&self) -> Mode {
        if self.baseline.is_some() {
            Mode::Baseline
        } else {
            Mode::Allowlist
        }
    }
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub profile: String,
    /// Severity assigned to every violation.
    pub severity: Severity,
    pub fail_on: FailOn,
    pub max_findings: usize,
    pub policy: Policy,
}
