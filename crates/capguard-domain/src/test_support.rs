use crate::ViolationSet;
use crate::policy::{EffectiveConfig, FailOn, Policy};
use capguard_types::{Capability, CapabilityInfo, CapabilityType, Function, Severity};
use std::collections::BTreeSet;

fn finding(capability: Capability, kind: CapabilityType, path: &[&str]) -> CapabilityInfo {
    CapabilityInfo {
        capability,
        capability_type: kind,
        path: path.iter().map(|name| Function::named(*name)).collect(),
        ..CapabilityInfo::default()
    }
}

pub fn transitive(capability: Capability, path: &[&str]) -> CapabilityInfo {
    finding(capability, CapabilityType::Transitive, path)
}

pub fn direct(capability: Capability, path: &[&str]) -> CapabilityInfo {
    finding(capability, CapabilityType::Direct, path)
}

pub fn caps(list: &[Capability]) -> BTreeSet<Capability> {
    list.iter().copied().collect()
}

pub fn violations(entries: &[(&str, &[Capability])]) -> ViolationSet {
    entries
        .iter()
        .map(|(package, list)| (package.to_string(), caps(list)))
        .collect()
}

pub fn config(severity: Severity) -> EffectiveConfig {
    EffectiveConfig {
        profile: "test".to_string(),
        severity,
        fail_on: FailOn::Error,
        max_findings: 200,
        policy: Policy::default(),
    }
}
