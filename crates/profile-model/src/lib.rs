//! Profile Model - the user's nested personal record.
//!
//! Paths are dot-joined object keys; array elements use their numeric index
//! (`school.0.dname`). The flattened path set is the vocabulary patterns use.

pub mod errors;
mod flatten;
mod template;

pub use errors::ProfileError;
pub use flatten::{flatten, get_by_path, FlatProfile};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A nested, JSON-shaped personal profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Profile {
    root: Map<String, Value>,
}

impl Profile {
    pub fn from_value(value: Value) -> Result<Self, ProfileError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(ProfileError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ProfileError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn empty() -> Self {
        Self { root: Map::new() }
    }

    /// The canonical empty job-entry profile.
    pub fn template() -> Self {
        Self {
            root: template::job_entry_template(),
        }
    }

    /// Fills keys missing from `self` with template defaults. Values present
    /// in `self` always win, including values of a different shape.
    pub fn merged_over_template(&self) -> Self {
        let mut merged = Value::Object(template::job_entry_template());
        merge_into(&mut merged, &Value::Object(self.root.clone()));
        match merged {
            Value::Object(root) => Self { root },
            _ => self.clone(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Raw (possibly composite) value at `path`.
    pub fn raw(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = step(current, segment)?;
        }
        Some(current)
    }

    pub fn to_json_pretty(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Value> for Profile {
    type Error = ProfileError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Profile> for Value {
    fn from(profile: Profile) -> Self {
        Value::Object(profile.root)
    }
}

pub(crate) fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    }
}

fn merge_into(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
