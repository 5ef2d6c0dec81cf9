//! Config parsing and profile resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.
//! Loading the baseline document and the standard library list is left to the caller.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{CapguardConfigV1, LegacyLinterSettings};
pub use resolve::{Overrides, ResolvedConfig, StdlibSetting};

/// On-disk config flavours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `capguard.toml`.
    Toml,
    /// The JSON linter settings with per-capability booleans.
    LegacyJson,
}

impl ConfigFormat {
    /// Pick the format from a file name: `.json` is the legacy flavour, anything else TOML.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".json") {
            ConfigFormat::LegacyJson
        } else {
            ConfigFormat::Toml
        }
    }
}

/// Parse `capguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<CapguardConfigV1> {
    let cfg: CapguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Parse the legacy JSON linter settings and lift them into the v1 model.
pub fn parse_config_json(input: &str) -> anyhow::Result<CapguardConfigV1> {
    let legacy: LegacyLinterSettings = serde_json::from_str(input)?;
    legacy.validate()?;
    Ok(legacy.into())
}

pub fn parse_config(input: &str, format: ConfigFormat) -> anyhow::Result<CapguardConfigV1> {
    match format {
        ConfigFormat::Toml => parse_config_toml(input),
        ConfigFormat::LegacyJson => parse_config_json(input),
    }
}

/// Resolve the effective config used by the engine (profile + overrides + allow-lists).
///
/// Every capability name is validated here, before any evaluation runs.
pub fn resolve_config(
    cfg: CapguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
