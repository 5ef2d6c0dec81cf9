//! Process-wide evaluation context.
//!
//! The excluded package set (normally the Go standard library) is derived once per
//! process and then only read. The context is owned by the caller and shared by
//! reference across concurrent evaluations.

use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::debug;

/// Where the excluded package set comes from.
#[derive(Clone, Debug)]
pub enum StdlibSource {
    /// Nothing is excluded.
    None,
    /// Treat import paths whose first element has no `.` as standard library.
    ImportPathHeuristic,
    /// An explicit package list, e.g. the output of `go list std`.
    Listed(Vec<String>),
}

/// Packages that are never attributed as dependency risk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExcludedPackages {
    None,
    ImportPathHeuristic,
    Set(BTreeSet<String>),
}

impl ExcludedPackages {
    pub fn contains(&self, package: &str) -> bool {
        match self {
            ExcludedPackages::None => false,
            ExcludedPackages::ImportPathHeuristic => {
                let first = package.split('/').next().unwrap_or_default();
                !first.is_empty() && !first.contains('.')
            }
            ExcludedPackages::Set(set) => set.contains(package),
        }
    }
}

#[derive(Debug)]
pub struct EvalContext {
    source: StdlibSource,
    excluded: OnceLock<ExcludedPackages>,
}

impl EvalContext {
    pub fn new(source: StdlibSource) -> Self {
        Self {
            source,
            excluded: OnceLock::new(),
        }
    }

    /// The excluded set, built on first access. Concurrent first readers block until the
    /// single initialisation has finished.
    pub fn excluded(&self) -> &ExcludedPackages {
        self.excluded.get_or_init(|| {
            let set = match &self.source {
                StdlibSource::None => ExcludedPackages::None,
                StdlibSource::ImportPathHeuristic => ExcludedPackages::ImportPathHeuristic,
                StdlibSource::Listed(packages) => ExcludedPackages::Set(
                    packages
                        .iter()
                        .map(|p| p.trim())
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect(),
                ),
            };
            debug!(source = self.source_kind(), "excluded package set initialised");
            set
        })
    }

    fn source_kind(&self) -> &'static str {
        match self.source {
            StdlibSource::None => "none",
            StdlibSource::ImportPathHeuristic => "heuristic",
            StdlibSource::Listed(_) => "listed",
        }
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        EvalContext::new(StdlibSource::ImportPathHeuristic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn heuristic_matches_stdlib_shaped_paths() {
        let excluded = ExcludedPackages::ImportPathHeuristic;
        assert!(excluded.contains("os"));
        assert!(excluded.contains("net/http"));
        assert!(excluded.contains("internal/poll"));
        assert!(!excluded.contains("github.com/google/uuid"));
        assert!(!excluded.contains("golang.org/x/sys/unix"));
        assert!(!excluded.contains(""));
    }

    #[test]
    fn listed_source_trims_and_skips_blank_lines() {
        let ctx = EvalContext::new(StdlibSource::Listed(vec![
            "os".to_string(),
            "  net/http ".to_string(),
            String::new(),
        ]));
        let excluded = ctx.excluded();
        assert!(excluded.contains("os"));
        assert!(excluded.contains("net/http"));
        assert!(!excluded.contains("fmt"));
    }

    #[test]
    fn initialises_once_across_threads() {
        let ctx = Arc::new(EvalContext::new(StdlibSource::Listed(vec!["os".to_string()])));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                thread::spawn(move || ctx.excluded() as *const ExcludedPackages as usize)
            })
            .collect();
        let addrs: BTreeSet<usize> = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect();
        assert_eq!(addrs.len(), 1);
    }
}
