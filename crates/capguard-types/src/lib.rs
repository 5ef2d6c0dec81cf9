//! Stable DTOs and IDs used across the capguard workspace.
//!
//! This crate is intentionally boring:
//! - the closed capability enumeration shared with capslock
//! - the capslock JSON document shape (findings and call paths)
//! - data types for the emitted report
//! - stable string IDs and codes
//! - canonical repo-relative path handling

#![forbid(unsafe_code)]

pub mod capability;
pub mod capslock;
pub mod ids;
pub mod path;
pub mod receipt;

pub use capability::{Capability, CapabilityType, UnknownCapability};
pub use capslock::{CapabilityInfo, CapabilityReport, Function, ModuleInfo, Site};
pub use path::RepoPath;
pub use receipt::{
    CapguardData, CapguardReport, Finding, Location, Mode, ReportEnvelope, SCHEMA_REPORT_V1,
    Severity, ToolMeta, Verdict,
};
