use anyhow::Context;
use capguard_types::Capability;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `capguard.toml` schema v1.
///
/// Capability names stay plain strings here; they are validated during resolution so
/// the error can name the offending package.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CapguardConfigV1 {
    /// Optional schema string for tooling (`capguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `strict` (default) or `warn`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// When to fail the check: `error` or `warning`. Defaults to the profile's choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<String>,

    /// How many findings to emit before truncating the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_findings: Option<u32>,

    /// Capabilities every dependency may use, e.g. `CAPABILITY_SYSTEM_CALLS`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_allowed_capabilities: Vec<String>,

    /// Dependency package -> capabilities it alone may use.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub package_allowed_capabilities: BTreeMap<String, Vec<String>>,

    /// Path to a `capslock -output=j` document used as baseline (relative to the repo root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<String>,

    /// Prefix identifying the own module. Discovered from `go.mod` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_prefix: Option<String>,

    /// Skip standard library packages (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_stdlib: Option<bool>,

    /// File listing standard library packages, one per line (e.g. `go list std`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdlib_list: Option<String>,
}

/// The JSON linter settings shape: capability names mapped to booleans.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LegacyLinterSettings {
    #[serde(rename = "GlobalAllowedCapabilities", default)]
    pub global_allowed_capabilities: BTreeMap<String, bool>,

    #[serde(rename = "PackageAllowedCapabilities", default)]
    pub package_allowed_capabilities: BTreeMap<String, BTreeMap<String, bool>>,
}

impl LegacyLinterSettings {
    /// Every key must name a capability, whether it is switched on or off.
    pub fn validate(&self) -> anyhow::Result<()> {
        for name in self.global_allowed_capabilities.keys() {
            name.parse::<Capability>()
                .context("invalid global capability")?;
        }
        for (package, caps) in &self.package_allowed_capabilities {
            for name in caps.keys() {
                name.parse::<Capability>()
                    .with_context(|| format!("invalid capability for package {package:?}"))?;
            }
        }
        Ok(())
    }
}

impl From<LegacyLinterSettings> for CapguardConfigV1 {
    fn from(legacy: LegacyLinterSettings) -> Self {
        let enabled = |m: BTreeMap<String, bool>| -> Vec<String> {
            m.into_iter().filter(|(_, on)| *on).map(|(c, _)| c).collect()
        };

        CapguardConfigV1 {
            global_allowed_capabilities: enabled(legacy.global_allowed_capabilities),
            package_allowed_capabilities: legacy
                .package_allowed_capabilities
                .into_iter()
                .map(|(pkg, caps)| (pkg, enabled(caps)))
                .collect(),
            ..CapguardConfigV1::default()
        }
    }
}
