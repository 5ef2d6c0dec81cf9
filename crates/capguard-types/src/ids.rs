//! Stable identifiers for checks and finding codes.
//!
//! `check_id` is a dotted namespace. `code` is a short snake_case discriminator.

// Checks
pub const CHECK_CAPS_NOT_ALLOWED: &str = "caps.not_allowed";

// Codes: caps.not_allowed
pub const CODE_CAPABILITY_NOT_ALLOWED: &str = "capability_not_allowed";
pub const CODE_NEW_CAPABILITY: &str = "new_capability";

// Tool-level
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";
