use crate::module::GoModule;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use capguard_domain::{LocationResolver, Resolution};
use capguard_types::{Location, RepoPath};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// An import spec found in a Go source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSite {
    pub import_path: String,
    pub file: Utf8PathBuf,
    /// 1-based.
    pub line: u32,
    /// 1-based column of the opening quote.
    pub col: u32,
}

/// Scan the non-test `.go` files of one package directory for import specs.
///
/// Files are visited in name order so the first site per import path is stable.
pub fn scan_imports(package_dir: &Utf8Path) -> anyhow::Result<Vec<ImportSite>> {
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(package_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::from_path_buf(e.into_path()).ok())
        .filter(|p| is_go_source(p))
        .collect();
    files.sort();

    let mut out = Vec::new();
    for file in files {
        let text = std::fs::read_to_string(&file).with_context(|| format!("read {file}"))?;
        out.extend(parse_imports(&text).into_iter().map(|(import_path, line, col)| {
            ImportSite {
                import_path,
                file: file.clone(),
                line,
                col,
            }
        }));
    }
    Ok(out)
}

fn is_go_source(path: &Utf8Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.ends_with(".go") && !n.ends_with("_test.go"))
}

/// Import specs in one file as `(path, line, col)`.
pub(crate) fn parse_imports(text: &str) -> Vec<(String, u32, u32)> {
    let mut out = Vec::new();
    let mut in_block = false;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let trimmed = raw.trim_start();

        if in_block {
            if trimmed.starts_with(')') {
                in_block = false;
                continue;
            }
            if let Some((path, col, tail)) = quoted_path(raw) {
                out.push((path, line_no, col));
                // `"fmt")` ends the group on the spec line.
                if closes_group(tail) {
                    in_block = false;
                }
            }
            continue;
        }

        let Some(rest) = trimmed.strip_prefix("import") else {
            continue;
        };
        if !rest.starts_with([' ', '\t', '(', '"', '`']) {
            continue;
        }
        let rest = rest.trim_start();
        if let Some(group) = rest.strip_prefix('(') {
            match quoted_path(raw) {
                Some((path, col, tail)) => {
                    out.push((path, line_no, col));
                    in_block = !closes_group(tail);
                }
                None => in_block = !closes_group(group),
            }
        } else if let Some((path, col, _)) = quoted_path(raw) {
            out.push((path, line_no, col));
        }
    }
    out
}

/// First interpreted or raw string literal on the line, with its 1-based character column
/// and the text after its closing quote.
fn quoted_path(line: &str) -> Option<(String, u32, &str)> {
    if let Some(i) = line.find("//") {
        if !line[..i].contains(['"', '`']) {
            return None;
        }
    }
    let (start, quote) = line.char_indices().find(|(_, c)| *c == '"' || *c == '`')?;
    let body = &line[start + 1..];
    let end = body.find(quote)?;
    let col = line[..start].chars().count() as u32 + 1;
    Some((body[..end].to_string(), col, &body[end + 1..]))
}

fn closes_group(tail: &str) -> bool {
    tail.split("//").next().unwrap_or_default().contains(')')
}

/// Anchors violations at the import that brings the dependency into the origin package.
///
/// Import sites are scanned once per origin up front, in parallel. Origins outside the
/// module, and dependencies not imported directly, resolve to `Unresolved`.
#[derive(Debug, Default)]
pub struct SourceResolver {
    repo_root: Utf8PathBuf,
    sites: BTreeMap<String, BTreeMap<String, ImportSite>>,
}

impl SourceResolver {
    pub fn scan(
        repo_root: &Utf8Path,
        module: &GoModule,
        origins: &[String],
    ) -> anyhow::Result<Self> {
        let scanned: Vec<(String, BTreeMap<String, ImportSite>)> = origins
            .par_iter()
            .map(|origin| -> anyhow::Result<_> {
                let Some(dir) = module.package_dir(origin) else {
                    warn!(
                        origin = origin.as_str(),
                        module = module.path.as_str(),
                        "origin package is outside the module"
                    );
                    return Ok((origin.clone(), BTreeMap::new()));
                };
                let mut by_path = BTreeMap::new();
                for site in scan_imports(&dir)? {
                    by_path.entry(site.import_path.clone()).or_insert(site);
                }
                debug!(
                    origin = origin.as_str(),
                    imports = by_path.len(),
                    "scanned package imports"
                );
                Ok((origin.clone(), by_path))
            })
            .collect::<anyhow::Result<_>>()?;

        Ok(Self {
            repo_root: repo_root.to_path_buf(),
            sites: scanned.into_iter().collect(),
        })
    }
}

impl LocationResolver for SourceResolver {
    fn resolve(&self, origin: &str, dependency: &str) -> Resolution {
        match self.sites.get(origin).and_then(|m| m.get(dependency)) {
            Some(site) => Resolution::At(Location {
                path: RepoPath::relative_to(&self.repo_root, &site.file),
                line: Some(site.line),
                col: Some(site.col),
            }),
            None => Resolution::Unresolved,
        }
    }
}
