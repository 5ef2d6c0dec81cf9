//! Shared test utilities for the capguard workspace.
//!
//! `xtask` regenerates golden reports at runtime, so normalization cannot live behind
//! `#[cfg(test)]`.

use serde_json::Value;

const TIMESTAMP: &str = "__TIMESTAMP__";
const VERSION: &str = "__VERSION__";

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// `tool.version` is replaced only on a root report envelope. Timestamp keys are replaced
/// at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = ["schema", "tool", "verdict", "findings", "data"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_envelope
            && let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
            && tool.contains_key("version")
        {
            tool.insert("version".to_string(), Value::String(VERSION.to_string()));
        }
    }
    normalize_timestamps(&mut value);
    value
}

fn normalize_timestamps(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "finished_at"] {
                if let Some(v) = map.get_mut(key) {
                    *v = Value::String(TIMESTAMP.to_string());
                }
            }
            map.values_mut().for_each(normalize_timestamps);
        }
        Value::Array(arr) => arr.iter_mut().for_each(normalize_timestamps),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_envelope_version_and_nested_timestamps() {
        let value = json!({
            "schema": "capguard.report.v1",
            "tool": {"name": "capguard", "version": "0.1.0"},
            "started_at": "2026-01-01T00:00:00Z",
            "finished_at": "2026-01-01T00:00:01Z",
            "verdict": "pass",
            "findings": [{"data": {"started_at": "x"}}],
            "data": {}
        });

        let out = normalize_nondeterministic(value);
        assert_eq!(out["tool"]["version"], VERSION);
        assert_eq!(out["started_at"], TIMESTAMP);
        assert_eq!(out["findings"][0]["data"]["started_at"], TIMESTAMP);
    }

    #[test]
    fn leaves_non_envelope_versions_alone() {
        let out = normalize_nondeterministic(json!({"tool": {"version": "1.2.3"}}));
        assert_eq!(out["tool"]["version"], "1.2.3");
    }
}
