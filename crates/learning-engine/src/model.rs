use std::collections::BTreeMap;

use action_locator::Locator;
use chrono::{DateTime, Utc};
use entryfill_core_types::{ControlKind, EngineIssue, FieldValue};
use serde::{Deserialize, Serialize};

/// How a learned field relates to the profile it was learned from.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "snake_case")]
pub enum Binding {
    /// No profile correspondence; replay the recorded value.
    #[default]
    Literal,
    /// This control is the mapping's entry for the path; the mapping replays it.
    Mapped(String),
    /// Matched the path but a later control won it; replay the current profile value.
    Alias(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub locator: Locator,
    pub value: FieldValue,
    pub kind: ControlKind,
    #[serde(default)]
    pub binding: Binding,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

/// A named, replayable mapping from profile paths to controls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    #[serde(default)]
    pub mapping: BTreeMap<String, Locator>,
    #[serde(default, alias = "learnedFields")]
    pub learned_fields: Vec<LearnedField>,
    pub metadata: PatternMetadata,
}

impl Pattern {
    /// Reserved name of the heuristic-only pattern.
    pub const DEFAULT_NAME: &'static str = "default";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            mapping: BTreeMap::new(),
            learned_fields: Vec::new(),
            metadata: PatternMetadata {
                name: name.into(),
                learned_at: None,
                page_url: None,
            },
        }
    }

    /// The heuristic-only pattern: nothing mapped, nothing learned.
    pub fn heuristic_default() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn is_heuristic_only(&self) -> bool {
        self.mapping.is_empty() && self.learned_fields.is_empty()
    }

    pub fn with_mapping(mut self, path: impl Into<String>, locator: Locator) -> Self {
        self.mapping.insert(path.into(), locator);
        self
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LearnStatus {
    Learned,
    /// Nothing matched; the caller should ask for a manual fill-through first.
    NoMatch { instruction: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnReport {
    pub pattern: Pattern,
    /// Profile paths recorded in the mapping.
    pub match_count: usize,
    pub status: LearnStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<EngineIssue>,
}

impl LearnReport {
    pub fn is_learned(&self) -> bool {
        matches!(self.status, LearnStatus::Learned)
    }
}
