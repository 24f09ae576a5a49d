//! Shared primitives for the entryfill workspace: identifiers, leaf values,
//! control kinds and the engine issue taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PageId(pub String);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// A primitive profile value. Every profile leaf is one of these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            FieldValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(flag) => Some(*flag),
            FieldValue::Text(_) => None,
        }
    }

    /// Empty text is "no value"; booleans always carry a value.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Flag(_) => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Flag(flag) => write!(f, "{}", flag),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Write semantics that apply to a page control.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Text,
    Select,
    Radio,
    Checkbox,
    SplitSegment,
}

impl ControlKind {
    pub fn label(&self) -> &'static str {
        match self {
            ControlKind::Text => "text",
            ControlKind::Select => "select",
            ControlKind::Radio => "radio",
            ControlKind::Checkbox => "checkbox",
            ControlKind::SplitSegment => "split_segment",
        }
    }
}

/// Recoverable conditions raised during learning and filling.
///
/// None of these abort a run; they are collected into reports and logged.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineIssue {
    #[error("locator for '{field}' matched no control")]
    UnresolvableLocator { field: String },

    #[error("'{field}' matched {candidates} controls; using the first in document order")]
    AmbiguousMatch { field: String, candidates: usize },

    #[error("no profile value matched any control on the page")]
    NoLearnableValue,

    #[error("cascade '{group}' stalled: {reason}")]
    CascadeStalled { group: String, reason: String },

    #[error("pattern '{name}' is malformed: {reason}")]
    MalformedPattern { name: String, reason: String },
}

impl EngineIssue {
    pub fn kind_label(&self) -> &'static str {
        match self {
            EngineIssue::UnresolvableLocator { .. } => "unresolvable_locator",
            EngineIssue::AmbiguousMatch { .. } => "ambiguous_match",
            EngineIssue::NoLearnableValue => "no_learnable_value",
            EngineIssue::CascadeStalled { .. } => "cascade_stalled",
            EngineIssue::MalformedPattern { .. } => "malformed_pattern",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_emptiness() {
        assert!(FieldValue::text("  ").is_empty());
        assert!(!FieldValue::text("a").is_empty());
        assert!(!FieldValue::Flag(false).is_empty());
    }

    #[test]
    fn field_value_untagged_json() {
        let parsed: Vec<FieldValue> = serde_json::from_str(r#"["x", true]"#).unwrap();
        assert_eq!(parsed, vec![FieldValue::text("x"), FieldValue::Flag(true)]);
    }

    #[test]
    fn issue_serializes_with_kind_tag() {
        let issue = EngineIssue::UnresolvableLocator {
            field: "tel.mobile".into(),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "unresolvable_locator");
        assert_eq!(issue.kind_label(), "unresolvable_locator");
    }
}
