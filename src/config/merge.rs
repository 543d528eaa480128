//! Field-by-field merging of configuration tiers.

use serde_json::Value;

/// Merge `overlay` onto `base`.
///
/// Objects merge key by key. Any other overlay value replaces the base,
/// except `null`, which leaves the base untouched.
///
/// ```
/// use serde_json::json;
/// use taskflow_client::config::deep_merge;
///
/// let base = json!({"api": {"base_url": "http://localhost:8080", "timeout_ms": 10000}});
/// let overlay = json!({"api": {"timeout_ms": 2000}});
/// assert_eq!(
///     deep_merge(base, overlay),
///     json!({"api": {"base_url": "http://localhost:8080", "timeout_ms": 2000}})
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let next = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, next);
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold tiers lowest-priority first.
pub fn deep_merge_all(tiers: impl IntoIterator<Item = Value>) -> Value {
    tiers.into_iter().fold(Value::Null, deep_merge)
}
