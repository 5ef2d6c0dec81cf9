//! Fuzz target for capslock JSON parsing.
//!
//! Goal: the parser should **never panic** on any input.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_capslock_document
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = capguard_repo::fuzz::parse_capslock(text);
    }
});
