//! The `check` use case: evaluate a capslock document against the policy and produce a report.

use anyhow::Context;
use camino::Utf8Path;
use capguard_domain::{
    EvalContext, LocationResolver, Resolution, StdlibSource, UnitViolations, aggregate,
    build_report, is_test_package, package_of,
};
use capguard_repo::{GoModule, SourceResolver};
use capguard_settings::{ConfigFormat, Overrides, ResolvedConfig, StdlibSetting};
use capguard_types::{
    CapabilityInfo, CapguardReport, ReportEnvelope, SCHEMA_REPORT_V1, ToolMeta, Verdict,
};
use rayon::prelude::*;
use std::collections::BTreeSet;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Repository root path. Relative config paths resolve against it.
    pub repo_root: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    pub config_format: ConfigFormat,
    /// CLI overrides.
    pub overrides: Overrides,
    /// Output of `capslock -output=j`.
    pub capslock_text: &'a str,
    /// Origin packages to evaluate. Empty means every package that starts a call path.
    pub packages: Vec<String>,
    /// Go sources used to anchor findings at their import statement. Without it findings
    /// carry no location.
    pub source_root: Option<&'a Utf8Path>,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: CapguardReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

struct Unanchored;

impl LocationResolver for Unanchored {
    fn resolve(&self, _origin: &str, _dependency: &str) -> Resolution {
        Resolution::Unanchored
    }
}

/// Run the check use case: parse config and inputs, evaluate every origin package, produce a report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        capguard_settings::CapguardConfigV1::default()
    } else {
        capguard_settings::parse_config(input.config_text, input.config_format)
            .context("parse config")?
    };

    let mut resolved = capguard_settings::resolve_config(cfg, input.overrides.clone())
        .context("resolve config")?;

    let report = capguard_repo::parse_capslock(input.capslock_text)?;
    let findings = report.capability_info;

    if let Some(path) = &resolved.baseline_path {
        let baseline = capguard_repo::load_capslock(&input.repo_root.join(path))
            .context("load baseline")?;
        info!(
            baseline = path.as_str(),
            findings = baseline.capability_info.len(),
            "comparing against baseline"
        );
        resolved.effective.policy.baseline = Some(baseline.capability_info);
    }

    let stdlib = match &resolved.stdlib {
        StdlibSetting::Disabled => StdlibSource::None,
        StdlibSetting::Heuristic => StdlibSource::ImportPathHeuristic,
        StdlibSetting::ListFile(path) => StdlibSource::Listed(
            capguard_repo::load_stdlib_list(&input.repo_root.join(path))
                .context("load standard library list")?,
        ),
    };
    let ctx = EvalContext::new(stdlib);

    let module = capguard_repo::find_go_module(input.source_root.unwrap_or(input.repo_root))
        .context("discover go.mod")?;
    let module_prefix = resolved
        .module_prefix
        .clone()
        .or_else(|| module.as_ref().map(|m| m.path.clone()));

    let origins = select_origins(&findings, &input.packages);
    info!(
        findings = findings.len(),
        origins = origins.len(),
        module = module_prefix.as_deref().unwrap_or("(per origin)"),
        mode = ?resolved.effective.policy.mode(),
        "evaluating capslock findings"
    );

    let policy = &resolved.effective.policy;
    let units = origins
        .par_iter()
        .map(|origin| {
            let prefix = module_prefix.as_deref().unwrap_or(origin.as_str());
            aggregate(&findings, origin, prefix, policy, ctx.excluded()).map(|violations| {
                UnitViolations {
                    origin: origin.clone(),
                    violations,
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .context("evaluate capslock findings")?;

    let domain_report = match input.source_root {
        Some(source_root) => {
            let module = match module {
                Some(m) => m,
                None => GoModule {
                    root: source_root.to_path_buf(),
                    path: module_prefix
                        .clone()
                        .context("no go.mod above the source root; set a module prefix")?,
                },
            };
            let resolver = SourceResolver::scan(input.repo_root, &module, &origins)
                .context("scan import statements")?;
            build_report(&units, &resolved.effective, &resolver)
        }
        None => build_report(&units, &resolved.effective, &Unanchored),
    };

    debug!(
        error = domain_report.counts.error,
        warning = domain_report.counts.warning,
        "domain report built"
    );

    let finished_at = OffsetDateTime::now_utc();
    info!(
        verdict = ?domain_report.verdict,
        findings = domain_report.findings.len(),
        "check finished"
    );

    let report = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "capguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at,
        verdict: domain_report.verdict,
        findings: domain_report.findings,
        data: domain_report.data,
    };

    Ok(CheckOutput {
        report,
        resolved_config: resolved,
    })
}

/// Origin packages to evaluate, sorted and deduplicated.
///
/// An explicit list wins; otherwise every package that starts a transitive call path is an
/// origin. Go test packages are never evaluated.
pub fn select_origins(findings: &[CapabilityInfo], requested: &[String]) -> Vec<String> {
    let origins: BTreeSet<String> = if requested.is_empty() {
        findings
            .iter()
            .filter(|f| f.is_transitive())
            .filter_map(|f| f.path.first())
            .map(|caller| package_of(&caller.name).to_string())
            .collect()
    } else {
        requested.iter().cloned().collect()
    };

    origins
        .into_iter()
        .filter(|p| !p.is_empty() && !is_test_package(p))
        .collect()
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}
