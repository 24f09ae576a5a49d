//! Profile flags that switch groups of fields on or off.

use entryfill_core_types::FieldValue;
use profile_model::Profile;
use serde::{Deserialize, Serialize};

use crate::heuristic::lookup;

/// Holds when the profile value at `flag` is truthy (`is: true`) or falsy
/// (`is: false`). A missing flag, `false` and empty text are falsy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub flag: String,
    pub is: bool,
}

impl Condition {
    pub fn when(flag: impl Into<String>, is: bool) -> Self {
        Self { flag: flag.into(), is }
    }

    pub fn holds(&self, profile: &Profile) -> bool {
        let truthy = match lookup(profile, &self.flag) {
            Some(FieldValue::Flag(value)) => value,
            Some(FieldValue::Text(text)) => !text.trim().is_empty(),
            None => false,
        };
        truthy == self.is
    }
}

/// What a `FieldGate` covers in a replayed pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateScope {
    /// Mapping paths equal to or below this prefix, except the flag itself.
    Paths(String),
    /// Learned fields whose locator records this control name.
    Control(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldGate {
    pub scope: GateScope,
    pub when: Condition,
}

impl FieldGate {
    pub fn paths(prefix: impl Into<String>, when: Condition) -> Self {
        Self {
            scope: GateScope::Paths(prefix.into()),
            when,
        }
    }

    pub fn control(name: impl Into<String>, when: Condition) -> Self {
        Self {
            scope: GateScope::Control(name.into()),
            when,
        }
    }

    pub(crate) fn covers_path(&self, path: &str) -> bool {
        let GateScope::Paths(prefix) = &self.scope else {
            return false;
        };
        if path == self.when.flag {
            return false;
        }
        path == prefix
            || path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }

    pub(crate) fn covers_control(&self, name: Option<&str>) -> bool {
        matches!((&self.scope, name), (GateScope::Control(gated), Some(name)) if gated == name)
    }
}

/// Whether every gate covering `path` lets it through.
pub(crate) fn path_open(gates: &[FieldGate], path: &str, profile: &Profile) -> bool {
    gates
        .iter()
        .filter(|gate| gate.covers_path(path))
        .all(|gate| gate.when.holds(profile))
}

pub(crate) fn control_open(gates: &[FieldGate], name: Option<&str>, profile: &Profile) -> bool {
    gates
        .iter()
        .filter(|gate| gate.covers_control(name))
        .all(|gate| gate.when.holds(profile))
}
