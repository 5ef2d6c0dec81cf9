use capguard_domain::policy::{EffectiveConfig, FailOn, Policy};
use capguard_types::Severity;

/// Preset profiles decide how loud a violation is. Allow-lists always come from config.
pub fn preset(profile: &str) -> anyhow::Result<EffectiveConfig> {
    match profile {
        "strict" => Ok(strict_profile()),
        "warn" => Ok(warn_profile()),
        other => anyhow::bail!("unknown profile: {other} (expected 'strict' or 'warn')"),
    }
}

fn strict_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "strict".to_string(),
        severity: Severity::Error,
        fail_on: FailOn::Error,
        max_findings: 200,
        policy: Policy::default(),
    }
}

// Surface violations without breaking the build.
fn warn_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "warn".to_string(),
        severity: Severity::Warning,
        fail_on: FailOn::Error,
        max_findings: 200,
        policy: Policy::default(),
    }
}
