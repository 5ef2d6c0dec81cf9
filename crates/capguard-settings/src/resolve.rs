use crate::{model::CapguardConfigV1, presets};
use anyhow::Context;
use capguard_domain::policy::{EffectiveConfig, FailOn};
use capguard_types::Capability;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub max_findings: Option<u32>,
    pub baseline: Option<String>,
    pub module_prefix: Option<String>,
    pub stdlib_list: Option<String>,
    /// Force the standard library filter off.
    pub no_stdlib_filter: bool,
}

/// How standard library packages are recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StdlibSetting {
    Disabled,
    Heuristic,
    /// Path to a package list, relative to the repo root.
    ListFile(String),
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    /// Engine config. `policy.baseline` stays empty until the caller loads `baseline_path`.
    pub effective: EffectiveConfig,
    pub baseline_path: Option<String>,
    pub module_prefix: Option<String>,
    pub stdlib: StdlibSetting,
}

pub fn resolve_config(
    cfg: CapguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let mut effective = presets::preset(&profile)?;

    if let Some(mf) = overrides.max_findings.or(cfg.max_findings) {
        effective.max_findings = mf as usize;
    }

    if let Some(fail_on_s) = cfg.fail_on.as_deref() {
        effective.fail_on = parse_fail_on(fail_on_s)?;
    }

    for name in &cfg.global_allowed_capabilities {
        let cap: Capability = name.parse().context("invalid global capability")?;
        effective.policy.global_allowed.insert(cap);
    }

    for (package, names) in &cfg.package_allowed_capabilities {
        let caps = names
            .iter()
            .map(|name| {
                name.parse::<Capability>()
                    .with_context(|| format!("invalid capability for package {package:?}"))
            })
            .collect::<anyhow::Result<BTreeSet<_>>>()?;
        effective.policy.package_allowed.insert(package.clone(), caps);
    }

    let stdlib = if overrides.no_stdlib_filter || cfg.exclude_stdlib == Some(false) {
        StdlibSetting::Disabled
    } else if let Some(list) = overrides.stdlib_list.or(cfg.stdlib_list) {
        StdlibSetting::ListFile(list)
    } else {
        StdlibSetting::Heuristic
    };

    Ok(ResolvedConfig {
        effective,
        baseline_path: overrides.baseline.or(cfg.baseline),
        module_prefix: non_empty(overrides.module_prefix).or(non_empty(cfg.module_prefix)),
        stdlib,
    })
}

// An empty prefix would mark every callee as intra-module.
fn non_empty(prefix: Option<String>) -> Option<String> {
    prefix.filter(|p| !p.is_empty())
}

fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "error" => Ok(FailOn::Error),
        "warning" | "warn" => Ok(FailOn::Warning),
        other => anyhow::bail!("unknown fail_on: {other} (expected error|warning)"),
    }
}
