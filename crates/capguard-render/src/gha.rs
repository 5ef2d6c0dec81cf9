use crate::{RenderableReport, RenderableSeverity};

/// Render findings as GitHub Actions workflow command annotations.
///
/// Format:
/// `::{level} file={path},line={line},col={col},title={title}::{message}`
pub fn render_github_annotations(report: &RenderableReport) -> Vec<String> {
    let mut out = Vec::new();

    for f in &report.findings {
        let level = match f.severity {
            RenderableSeverity::Error => "error",
            RenderableSeverity::Warning => "warning",
            RenderableSeverity::Info => "notice",
        };

        let mut props: Vec<String> = Vec::new();
        if let Some(loc) = &f.location {
            props.push(format!("file={}", escape_property(&loc.path)));
            if let Some(line) = loc.line {
                props.push(format!("line={}", line));
            }
            if let Some(col) = loc.col {
                props.push(format!("col={}", col));
            }
        }
        if let Some(cap) = &f.capability {
            props.push(format!("title={}", escape_property(&format!("capguard: {cap}"))));
        }

        let check_id = f.check_id.as_deref().unwrap_or("capguard");
        let message = escape_data(&format!("[{}:{}] {}", check_id, f.code, f.message));

        if props.is_empty() {
            out.push(format!("::{}::{}", level, message));
        } else {
            out.push(format!("::{} {}::{}", level, props.join(","), message));
        }
    }

    out
}

fn escape_data(v: &str) -> String {
    v.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(v: &str) -> String {
    escape_data(v).replace(':', "%3A").replace(',', "%2C")
}
