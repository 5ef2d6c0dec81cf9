use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a capability violation.
///
/// Identity fields: check_id, code, origin package, dependency package, capability.
/// Locations are left out so moving an import does not change the fingerprint.
pub fn fingerprint_for_violation(
    check_id: &str,
    code: &str,
    origin: &str,
    dependency: &str,
    capability: &str,
) -> String {
    let canonical = [check_id, code, origin, dependency, capability].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
