//! Errors raised by the evaluation core.

use thiserror::Error;

/// The capability producer broke its contract.
///
/// This is never a policy outcome: it aborts the whole evaluation and no partial
/// result is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ContractViolation {
    /// A transitive finding must name at least the caller and the callee.
    #[error("transitive capability {capability} has a call path of length {len}, expected at least 2")]
    ShortPath { capability: String, len: usize },
}
