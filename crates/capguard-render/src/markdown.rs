use crate::{RenderableFinding, RenderableReport, RenderableSeverity, RenderableVerdictStatus};

const UNATTRIBUTED: &str = "(unattributed)";

/// Render a PR-comment friendly summary, one section per dependency package.
///
/// Sections keep the order in which their first finding appears in the report.
pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Capguard report\n\n");
    let verdict = match report.verdict {
        RenderableVerdictStatus::Pass => "PASS",
        RenderableVerdictStatus::Warn => "WARN",
        RenderableVerdictStatus::Fail => "FAIL",
    };
    out.push_str(&format!(
        "- Verdict: **{}**\n- Mode: {} (profile `{}`)\n- Findings: {} (emitted) / {} (total)\n\n",
        verdict,
        report.data.mode,
        report.data.profile,
        report.data.findings_emitted,
        report.data.findings_total
    ));

    if let Some(r) = &report.data.truncated_reason {
        out.push_str(&format!("> Note: {}\n\n", r));
    }

    if report.findings.is_empty() {
        out.push_str("No dependency uses a capability outside its allowance.\n");
        return out;
    }

    out.push_str("## Findings\n");

    for (dependency, findings) in group_by_dependency(&report.findings) {
        out.push_str(&format!("\n### `{}`\n\n", dependency));
        for f in findings {
            out.push_str(&finding_line(f));
            if let Some(help) = &f.help {
                out.push_str(&format!("  - help: {}\n", help));
            }
        }
    }

    out
}

fn group_by_dependency(findings: &[RenderableFinding]) -> Vec<(&str, Vec<&RenderableFinding>)> {
    let mut groups: Vec<(&str, Vec<&RenderableFinding>)> = Vec::new();
    for f in findings {
        let key = f.dependency.as_deref().unwrap_or(UNATTRIBUTED);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(f),
            None => groups.push((key, vec![f])),
        }
    }
    groups
}

fn finding_line(f: &RenderableFinding) -> String {
    let sev = match f.severity {
        RenderableSeverity::Info => "INFO",
        RenderableSeverity::Warning => "WARN",
        RenderableSeverity::Error => "ERROR",
    };

    let mut line = match &f.capability {
        Some(cap) => format!("- [{}] `{}`", sev, cap),
        None => format!("- [{}] `{}`: {}", sev, f.code, f.message),
    };
    if let Some(origin) = &f.origin {
        line.push_str(&format!(" reached from `{}`", origin));
    }
    if let Some(loc) = &f.location {
        match loc.line {
            Some(n) => line.push_str(&format!(" at `{}`:{}", loc.path, n)),
            None => line.push_str(&format!(" at `{}`", loc.path)),
        }
    }
    line.push('\n');
    line
}
