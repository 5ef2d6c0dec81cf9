//! Fuzz target for the `go.mod` and Go import scanners.
//!
//! Both are line-based and slice strings by byte offsets, so multi-byte input matters.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_go_sources
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = capguard_repo::fuzz::parse_go_mod(text);

        for (path, line, col) in capguard_repo::fuzz::parse_go_imports(text) {
            assert!(line >= 1 && col >= 1, "positions are 1-based: {path} {line}:{col}");
        }
    }
});
