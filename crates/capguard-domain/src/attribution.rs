//! Attribution: which dependency package owns a transitive finding.

use crate::error::ContractViolation;
use capguard_types::CapabilityInfo;
use tracing::trace;

/// Attribute `finding` to the dependency called from `origin_package`.
///
/// Returns `Ok(None)` when the finding does not apply to this origin:
/// - it is not transitive
/// - `path[0]` belongs to another package
/// - `path[1]` has no owning package
/// - `path[1]` lives inside the own module (`own_module_prefix`)
///
/// A transitive finding with fewer than two path elements is a contract violation.
pub fn attribute(
    finding: &CapabilityInfo,
    origin_package: &str,
    own_module_prefix: &str,
) -> Result<Option<String>, ContractViolation> {
    if !finding.is_transitive() {
        return Ok(None);
    }

    let [caller, callee, ..] = finding.path.as_slice() else {
        return Err(ContractViolation::ShortPath {
            capability: finding.capability.to_string(),
            len: finding.path.len(),
        });
    };

    if package_of(&caller.name) != origin_package {
        return Ok(None);
    }

    let dependency = package_of(&callee.name);
    if dependency.is_empty() {
        return Ok(None);
    }

    // Calls into other packages of the same module are never dependency risk.
    if dependency.starts_with(own_module_prefix) {
        trace!(dependency, own_module_prefix, "intra-module call skipped");
        return Ok(None);
    }

    Ok(Some(dependency.to_string()))
}

/// Owning package of a fully qualified symbol.
///
/// `pkg.Func` -> `pkg`, `(*pkg.Type).Method` -> `pkg`, `(pkg.Type).Method` -> `pkg`.
/// Names without a `.` separator have no package and yield `""`.
pub fn package_of(symbol: &str) -> &str {
    let mut name = symbol;
    if let Some(inner) = name.strip_prefix('(') {
        name = match inner.rfind(')') {
            Some(end) => &inner[..end],
            None => inner,
        };
    }
    name = name.trim_start_matches('*');

    // Type arguments may themselves be qualified: `pkg.Map[example.com/x.T]`.
    if let Some(open) = name.find('[') {
        name = &name[..open];
    }

    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => "",
    }
}
