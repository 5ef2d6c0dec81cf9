//! The closed set of capability kinds reported by capslock.
//!
//! Variant order follows the capslock proto numbering, so sorted sets of
//! capabilities iterate in the same order capslock prints them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum Capability {
    #[default]
    #[serde(rename = "CAPABILITY_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "CAPABILITY_SAFE")]
    Safe,
    #[serde(rename = "CAPABILITY_FILES")]
    Files,
    #[serde(rename = "CAPABILITY_NETWORK")]
    Network,
    #[serde(rename = "CAPABILITY_RUNTIME")]
    Runtime,
    #[serde(rename = "CAPABILITY_READ_SYSTEM_STATE")]
    ReadSystemState,
    #[serde(rename = "CAPABILITY_MODIFY_SYSTEM_STATE")]
    ModifySystemState,
    #[serde(rename = "CAPABILITY_OPERATING_SYSTEM")]
    OperatingSystem,
    #[serde(rename = "CAPABILITY_SYSTEM_CALLS")]
    SystemCalls,
    #[serde(rename = "CAPABILITY_ARBITRARY_EXECUTION")]
    ArbitraryExecution,
    #[serde(rename = "CAPABILITY_CGO")]
    Cgo,
    #[serde(rename = "CAPABILITY_UNANALYZED")]
    Unanalyzed,
    #[serde(rename = "CAPABILITY_UNSAFE_POINTER")]
    UnsafePointer,
    #[serde(rename = "CAPABILITY_REFLECT")]
    Reflect,
    #[serde(rename = "CAPABILITY_EXEC")]
    Exec,
}

impl Capability {
    pub const ALL: [Capability; 15] = [
        Capability::Unspecified,
        Capability::Safe,
        Capability::Files,
        Capability::Network,
        Capability::Runtime,
        Capability::ReadSystemState,
        Capability::ModifySystemState,
        Capability::OperatingSystem,
        Capability::SystemCalls,
        Capability::ArbitraryExecution,
        Capability::Cgo,
        Capability::Unanalyzed,
        Capability::UnsafePointer,
        Capability::Reflect,
        Capability::Exec,
    ];

    /// Canonical capslock name, e.g. `CAPABILITY_FILES`.
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Unspecified => "CAPABILITY_UNSPECIFIED",
            Capability::Safe => "CAPABILITY_SAFE",
            Capability::Files => "CAPABILITY_FILES",
            Capability::Network => "CAPABILITY_NETWORK",
            Capability::Runtime => "CAPABILITY_RUNTIME",
            Capability::ReadSystemState => "CAPABILITY_READ_SYSTEM_STATE",
            Capability::ModifySystemState => "CAPABILITY_MODIFY_SYSTEM_STATE",
            Capability::OperatingSystem => "CAPABILITY_OPERATING_SYSTEM",
            Capability::SystemCalls => "CAPABILITY_SYSTEM_CALLS",
            Capability::ArbitraryExecution => "CAPABILITY_ARBITRARY_EXECUTION",
            Capability::Cgo => "CAPABILITY_CGO",
            Capability::Unanalyzed => "CAPABILITY_UNANALYZED",
            Capability::UnsafePointer => "CAPABILITY_UNSAFE_POINTER",
            Capability::Reflect => "CAPABILITY_REFLECT",
            Capability::Exec => "CAPABILITY_EXEC",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// Whether a capability is used by the analyzed package itself or reached
/// through a dependency.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum CapabilityType {
    #[default]
    #[serde(rename = "CAPABILITY_TYPE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "CAPABILITY_TYPE_DIRECT")]
    Direct,
    #[serde(rename = "CAPABILITY_TYPE_TRANSITIVE")]
    Transitive,
}
