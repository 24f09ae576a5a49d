use std::collections::BTreeMap;

use entryfill_core_types::FieldValue;
use serde_json::Value;

use crate::{step, Profile};

/// Path to leaf value. Ordered so iteration is deterministic; lookups are by key.
pub type FlatProfile = BTreeMap<String, FieldValue>;

/// Flattens every primitive leaf of `profile` into `path -> value`.
pub fn flatten(profile: &Profile) -> FlatProfile {
    let mut out = FlatProfile::new();
    for (key, value) in profile.as_map() {
        walk(key, value, &mut out);
    }
    out
}

/// Leaf value at `path`, or `None` when the path is missing or composite.
pub fn get_by_path(profile: &Profile, path: &str) -> Option<FieldValue> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = profile.as_map().get(first)?;
    for segment in segments {
        current = step(current, segment)?;
    }
    leaf(current)
}

fn walk(prefix: &str, value: &Value, out: &mut FlatProfile) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                walk(&format!("{prefix}.{key}"), child, out);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                walk(&format!("{prefix}.{idx}"), child, out);
            }
        }
        other => {
            if let Some(leaf) = leaf(other) {
                out.insert(prefix.to_string(), leaf);
            }
        }
    }
}

fn leaf(value: &Value) -> Option<FieldValue> {
    match value {
        Value::String(text) => Some(FieldValue::Text(text.clone())),
        Value::Bool(flag) => Some(FieldValue::Flag(*flag)),
        Value::Number(number) => Some(FieldValue::Text(number.to_string())),
        Value::Null => Some(FieldValue::Text(String::new())),
        Value::Object(_) | Value::Array(_) => None,
    }
}
