use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};

/// The Go module enclosing the analyzed sources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoModule {
    /// Directory holding `go.mod`.
    pub root: Utf8PathBuf,
    /// Module path from the `module` directive.
    pub path: String,
}

impl GoModule {
    /// Directory of `package` when it lives inside this module.
    pub fn package_dir(&self, package: &str) -> Option<Utf8PathBuf> {
        if package == self.path {
            return Some(self.root.clone());
        }
        let rest = package.strip_prefix(&self.path)?.strip_prefix('/')?;
        Some(self.root.join(rest))
    }
}

/// Walk up from `start` to the nearest `go.mod` and read its module path.
///
/// Returns `Ok(None)` when no `go.mod` exists above `start`.
pub fn find_go_module(start: &Utf8Path) -> anyhow::Result<Option<GoModule>> {
    for dir in start.ancestors() {
        let candidate = dir.join("go.mod");
        if !candidate.is_file() {
            continue;
        }
        let text =
            std::fs::read_to_string(&candidate).with_context(|| format!("read {candidate}"))?;
        let path = parse_module_directive(&text)
            .with_context(|| format!("{candidate} has no module directive"))?;
        return Ok(Some(GoModule {
            root: dir.to_path_buf(),
            path,
        }));
    }
    Ok(None)
}

/// Extract the module path from `go.mod` text.
pub fn parse_module_directive(text: &str) -> Option<String> {
    for line in text.lines() {
        let line = strip_line_comment(line).trim();
        let Some(rest) = line.strip_prefix("module") else {
            continue;
        };
        // `modulex` is not a directive.
        if !rest.starts_with([' ', '\t', '"', '`']) {
            continue;
        }
        let value = rest.trim();
        let value = unquote(value).unwrap_or(value);
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn unquote(v: &str) -> Option<&str> {
    v.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| v.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
}
