//! The capslock JSON document (`capslock -output=j`).
//!
//! capslock emits protojson: lowerCamelCase field names, enum values as
//! strings, 64-bit integers as strings, and zero values omitted. The proto
//! snake_case field names are accepted as aliases.

use crate::{Capability, CapabilityType};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityReport {
    #[serde(default, alias = "capability_info")]
    pub capability_info: Vec<CapabilityInfo>,

    #[serde(default, alias = "module_info", skip_serializing_if = "Vec::is_empty")]
    pub module_info: Vec<ModuleInfo>,
}

/// One observed use of a capability, with the call path that reaches it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityInfo {
    #[serde(default, alias = "package_name", skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    #[serde(default)]
    pub capability: Capability,

    #[serde(default, alias = "dep_path", skip_serializing_if = "Option::is_none")]
    pub dep_path: Option<String>,

    /// Call path from the analyzed function down to the capability use.
    #[serde(default)]
    pub path: Vec<Function>,

    #[serde(default, alias = "package_dir", skip_serializing_if = "Option::is_none")]
    pub package_dir: Option<String>,

    #[serde(default, alias = "capability_type")]
    pub capability_type: CapabilityType,
}

/// A call-site descriptor. `name` is fully qualified: `pkg.Func` or
/// `(*pkg.Type).Method`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Function {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<Site>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Site {
    #[serde(default)]
    pub filename: String,

    /// Number or decimal string.
    #[serde(default, deserialize_with = "proto_int64")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub line: Option<i64>,

    #[serde(default, deserialize_with = "proto_int64")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub column: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModuleInfo {
    #[serde(default)]
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl CapabilityInfo {
    pub fn is_transitive(&self) -> bool {
        self.capability_type == CapabilityType::Transitive
    }
}

impl Function {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Function::default()
        }
    }
}

// protojson writes int64 as a JSON string; hand-written documents use numbers.
fn proto_int64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Number(i64),
        Text(String),
    }

    match Option::<Int64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Int64::Number(n)) => Ok(Some(n)),
        Some(Int64::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
