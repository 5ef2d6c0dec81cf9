//! Fuzz target for attribution over arbitrary call paths.
//!
//! Goal: `attribute` never panics, and whatever it returns is a package named in `path[1]`.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_attribution
//! ```

#![no_main]

use arbitrary::Arbitrary;
use capguard_domain::{attribute, package_of};
use capguard_types::{Capability, CapabilityInfo, CapabilityType, Function};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct AttributionInput {
    symbols: Vec<String>,
    origin: String,
    prefix: String,
    transitive: bool,
}

fuzz_target!(|input: AttributionInput| {
    if input.symbols.len() > 16 || input.symbols.iter().any(|s| s.len() > 256) {
        return;
    }

    let finding = CapabilityInfo {
        capability: Capability::Files,
        capability_type: if input.transitive {
            CapabilityType::Transitive
        } else {
            CapabilityType::Direct
        },
        path: input.symbols.iter().map(Function::named).collect(),
        ..CapabilityInfo::default()
    };

    match attribute(&finding, &input.origin, &input.prefix) {
        Ok(Some(dep)) => assert_eq!(dep, package_of(&input.symbols[1])),
        Ok(None) => {}
        Err(_) => assert!(input.transitive && input.symbols.len() < 2),
    }
});
