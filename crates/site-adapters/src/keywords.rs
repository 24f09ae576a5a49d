use entryfill_core_types::ControlKind;
use heuristic_finder::{FinderFilter, KeywordSet, MONTHS, PREFECTURES};
use once_cell::sync::Lazy;
use profile_model::Profile;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AdapterError;
use crate::gate::Condition;

const BUILTIN_TABLE: &str = include_str!("../keywords/default.yaml");

static BUILTIN: Lazy<KeywordTable> = Lazy::new(|| {
    KeywordTable::from_yaml(BUILTIN_TABLE).unwrap_or_else(|err| {
        warn!(error = %err, "built-in keyword table unreadable; heuristics limited to name matching");
        KeywordTable::default()
    })
});

/// Fill order of the heuristic adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Identity,
    Address,
    Contact,
    Education,
}

impl Section {
    pub const ORDER: [Section; 4] = [
        Section::Identity,
        Section::Address,
        Section::Contact,
        Section::Education,
    ];

    /// Section a flattened path belongs to when no table entry says.
    pub fn of_path(path: &str) -> Section {
        match path.split('.').next().unwrap_or_default() {
            "address" => Section::Address,
            "tel" | "email" => Section::Contact,
            "school" => Section::Education,
            _ => Section::Identity,
        }
    }
}

/// Known option lists that tell same-shaped selects apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vocabulary {
    Prefectures,
    Months,
}

impl Vocabulary {
    fn words(self) -> (&'static [&'static str], usize) {
        match self {
            Vocabulary::Prefectures => (PREFECTURES, 10),
            Vocabulary::Months => (MONTHS, 12),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordField {
    pub path: String,
    pub section: Section,
    pub sets: Vec<KeywordSet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<ControlKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vocabulary>,
    /// Any of these in the identification text vetoes the control.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reject: Vec<String>,
    /// Profile flag that must hold for this entry to be filled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
}

impl KeywordField {
    pub fn enabled_for(&self, profile: &Profile) -> bool {
        self.when.as_ref().map_or(true, |condition| condition.holds(profile))
    }

    /// Filters to try in order: the full one, then (for vocabulary fields)
    /// one without the vocabulary so free-text variants still match.
    pub fn filters(&self) -> Vec<FinderFilter> {
        let mut base = FinderFilter::none().kinds(&self.kinds);
        if !self.reject.is_empty() {
            let reject: Vec<String> = self.reject.iter().map(|word| word.to_lowercase()).collect();
            base = base.predicate(move |page, node| {
                let text = heuristic_finder::identification_text(page, node);
                !reject.iter().any(|word| text.contains(word.as_str()))
            });
        }
        match self.vocabulary {
            Some(vocabulary) => {
                let (words, min) = vocabulary.words();
                vec![base.clone().vocabulary(words, min), base]
            }
            None => vec![base],
        }
    }
}

/// Keyword sets per profile path; configuration, not engine logic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTable {
    pub fields: Vec<KeywordField>,
}

impl KeywordTable {
    pub fn from_yaml(text: &str) -> Result<Self, AdapterError> {
        let table: KeywordTable = serde_yaml::from_str(text)?;
        if let Some(field) = table.fields.iter().find(|field| field.sets.is_empty()) {
            return Err(AdapterError::EmptyField(field.path.clone()));
        }
        Ok(table)
    }

    /// The table shipped with the crate.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn to_yaml(&self) -> Result<String, AdapterError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Entries of `section` in table order.
    pub fn section(&self, section: Section) -> impl Iterator<Item = &KeywordField> {
        self.fields.iter().filter(move |field| field.section == section)
    }

    /// Entries for `path` in table order.
    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a KeywordField> + 'a {
        self.fields.iter().filter(move |field| field.path == path)
    }

    pub fn covers(&self, path: &str) -> bool {
        self.fields.iter().any(|field| field.path == path)
    }
}
