use crate::ViolationSet;
use crate::fingerprint::fingerprint_for_violation;
use crate::policy::{EffectiveConfig, FailOn};
use crate::report::{DomainReport, SeverityCounts};
use capguard_types::{
    Capability, CapguardData, Finding, Location, Mode, Severity, Verdict, ids,
};
use serde_json::json;
use std::collections::BTreeSet;
use tracing::debug;

/// Outcome of anchoring a violation at the import that introduces the dependency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The import statement was found.
    At(Location),
    /// No source tree is available; report without a location.
    Unanchored,
    /// A source tree is available but the import was not found; drop the report.
    Unresolved,
}

/// The reporting side of the evaluation: resolves where a dependency enters an origin
/// package. Implementations may do I/O; the engine only consumes the answer.
pub trait LocationResolver: Sync {
    fn resolve(&self, origin: &str, dependency: &str) -> Resolution;
}

/// Violations found while evaluating one origin package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitViolations {
    pub origin: String,
    pub violations: ViolationSet,
}

/// Go test binaries (`pkg.test`) and external test packages (`pkg_test`) are not evaluated.
pub fn is_test_package(package: &str) -> bool {
    package.ends_with(".test") || package.ends_with("_test")
}

struct Pending {
    origin: String,
    dependency: String,
    capability: Capability,
    location: Option<Location>,
}

pub fn build_report(
    units: &[UnitViolations],
    cfg: &EffectiveConfig,
    resolver: &dyn LocationResolver,
) -> DomainReport {
    let mode = cfg.policy.mode();
    let mut pending = Vec::new();
    let mut dropped = 0usize;

    for unit in units {
        for (dependency, capabilities) in &unit.violations {
            if capabilities.is_empty() {
                continue;
            }
            let location = match resolver.resolve(&unit.origin, dependency) {
                Resolution::At(loc) => Some(loc),
                Resolution::Unanchored => None,
                Resolution::Unresolved => {
                    debug!(
                        origin = unit.origin.as_str(),
                        dependency = dependency.as_str(),
                        "no import found for dependency; dropping its violations"
                    );
                    dropped += capabilities.len();
                    continue;
                }
            };
            for capability in capabilities {
                pending.push(Pending {
                    origin: unit.origin.clone(),
                    dependency: dependency.clone(),
                    capability: *capability,
                    location: location.clone(),
                });
            }
        }
    }

    // Deterministic ordering before truncation.
    pending.sort_by(compare_pending);

    let total = pending.len() as u32;
    let mut truncated_reason: Option<String> = None;
    if pending.len() > cfg.max_findings {
        pending.truncate(cfg.max_findings);
        truncated_reason = Some(format!(
            "findings truncated to max_findings={}",
            cfg.max_findings
        ));
    }

    let findings: Vec<Finding> = pending
        .into_iter()
        .map(|p| to_finding(p, mode, cfg.severity))
        .collect();

    let verdict = compute_verdict(&findings, cfg.fail_on);
    let counts = SeverityCounts::from_findings(&findings);

    let touched: BTreeSet<&str> = units
        .iter()
        .flat_map(|u| u.violations.keys().map(String::as_str))
        .collect();

    if dropped > 0 {
        debug!(dropped, "violations dropped for lack of a source location");
    }

    let data = CapguardData {
        profile: cfg.profile.clone(),
        mode,
        packages_evaluated: units.len() as u32,
        dependencies_touched: touched.len() as u32,
        findings_total: total,
        findings_emitted: findings.len() as u32,
        truncated_reason,
    };

    DomainReport {
        verdict,
        findings,
        data,
        counts,
    }
}

fn to_finding(p: Pending, mode: Mode, severity: Severity) -> Finding {
    let message = format!(
        "Package {} has not allowed capability {}",
        p.dependency, p.capability
    );
    let (code, help) = match mode {
        Mode::Allowlist => (
            ids::CODE_CAPABILITY_NOT_ALLOWED,
            format!(
                "Allow {} for {} under package_allowed_capabilities, or drop the dependency.",
                p.capability, p.dependency
            ),
        ),
        Mode::Baseline => (
            ids::CODE_NEW_CAPABILITY,
            "Review the new capability, then allow it or refresh the baseline.".to_string(),
        ),
    };

    let fingerprint = fingerprint_for_violation(
        ids::CHECK_CAPS_NOT_ALLOWED,
        code,
        &p.origin,
        &p.dependency,
        p.capability.as_str(),
    );

    Finding {
        severity,
        check_id: ids::CHECK_CAPS_NOT_ALLOWED.to_string(),
        code: code.to_string(),
        message,
        location: p.location,
        help: Some(help),
        fingerprint: Some(fingerprint),
        data: json!({
            "origin": p.origin,
            "dependency": p.dependency,
            "capability": p.capability.as_str(),
        }),
    }
}

fn compute_verdict(findings: &[Finding], fail_on: FailOn) -> Verdict {
    let has_error = findings.iter().any(|f| f.severity == Severity::Error);
    if has_error {
        return Verdict::Fail;
    }

    let has_warn = findings.iter().any(|f| f.severity == Severity::Warning);
    if has_warn {
        return match fail_on {
            FailOn::Warning => Verdict::Fail,
            FailOn::Error => Verdict::Warn,
        };
    }

    Verdict::Pass
}

fn compare_pending(a: &Pending, b: &Pending) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) location.path (missing last)
    // 2) location.line (missing last)
    // 3) dependency
    // 4) capability
    // 5) origin
    let key = |p: &Pending| {
        (
            p.location.is_none(),
            p.location.as_ref().map(|l| l.path.as_str().to_string()),
            p.location.as_ref().map(|l| l.line.unwrap_or(u32::MAX)),
        )
    };

    key(a)
        .cmp(&key(b))
        .then(a.dependency.cmp(&b.dependency))
        .then(a.capability.cmp(&b.capability))
        .then(a.origin.cmp(&b.origin))
}
