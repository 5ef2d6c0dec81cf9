//! Repository adapters: read capslock documents, discover the Go module, locate imports.
//!
//! This crate is allowed to do filesystem IO. It should not spawn external processes;
//! running capslock (and `go list std`) is left to the caller, which hands over their output.

#![forbid(unsafe_code)]

mod imports;
mod module;

use anyhow::Context;
use camino::Utf8Path;
use capguard_types::CapabilityReport;

pub use imports::{ImportSite, SourceResolver, scan_imports};
pub use module::{GoModule, find_go_module, parse_module_directive};

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    use super::*;

    /// Parse arbitrary text as a capslock JSON document. **Never panics** on any input.
    pub fn parse_capslock(text: &str) -> anyhow::Result<()> {
        let _ = super::parse_capslock(text)?;
        Ok(())
    }

    /// Parse arbitrary text as a `go.mod` file. **Never panics** on any input.
    pub fn parse_go_mod(text: &str) -> Option<String> {
        parse_module_directive(text)
    }

    /// Extract import specs from arbitrary Go source text. **Never panics** on any input.
    pub fn parse_go_imports(text: &str) -> Vec<(String, u32, u32)> {
        imports::parse_imports(text)
    }
}

/// Parse the output of `capslock -output=j`.
pub fn parse_capslock(text: &str) -> anyhow::Result<CapabilityReport> {
    serde_json::from_str(text).context("parse capslock JSON (expected `capslock -output=j` output)")
}

/// Read and parse a capslock document from disk.
pub fn load_capslock(path: &Utf8Path) -> anyhow::Result<CapabilityReport> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    parse_capslock(&text).with_context(|| format!("load {path}"))
}

/// Read a standard library package list (one import path per line, `#` starts a comment).
pub fn load_stdlib_list(path: &Utf8Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use capguard_types::{Capability, CapabilityType};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path")
    }

    #[test]
    fn load_capslock_reads_protojson() {
        let tmp = TempDir::new().expect("temp dir");
        let path = utf8_root(&tmp).join("caps.json");
        std::fs::write(
            &path,
            r#"{
  "capabilityInfo": [
    {
      "packageName": "main",
      "capability": "CAPABILITY_NETWORK",
      "depPath": "example.com/app.main net.Dial",
      "path": [{"name": "example.com/app.main"}, {"name": "net.Dial"}],
      "packageDir": "example.com/app",
      "capabilityType": "CAPABILITY_TYPE_TRANSITIVE"
    }
  ]
}"#,
        )
        .expect("write");

        let report = load_capslock(&path).expect("load");
        assert_eq!(report.capability_info.len(), 1);
        assert_eq!(report.capability_info[0].capability, Capability::Network);
        assert_eq!(
            report.capability_info[0].capability_type,
            CapabilityType::Transitive
        );
    }

    #[test]
    fn parse_error_mentions_capslock_output_flag() {
        let err = parse_capslock("capability: files").expect_err("not JSON");
        assert!(format!("{err:#}").contains("capslock -output=j"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let tmp = TempDir::new().expect("temp dir");
        let path = utf8_root(&tmp).join("nope.json");
        let err = load_capslock(&path).expect_err("missing");
        assert!(format!("{err:#}").contains("nope.json"));
    }

    #[test]
    fn stdlib_list_skips_comments_and_blanks() {
        let tmp = TempDir::new().expect("temp dir");
        let path = utf8_root(&tmp).join("std.txt");
        std::fs::write(&path, "# go list std\nfmt\n\n  net/http  \nos\n").expect("write");

        let list = load_stdlib_list(&path).expect("load");
        assert_eq!(list, vec!["fmt", "net/http", "os"]);
    }

    proptest! {
        #[test]
        fn fuzz_parsers_never_panic(input in ".*") {
            let _ = fuzz::parse_capslock(&input);
            let _ = fuzz::parse_go_mod(&input);
            let _ = fuzz::parse_go_imports(&input);
        }
    }
}
