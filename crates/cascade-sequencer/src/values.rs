use entryfill_core_types::FieldValue;
use profile_model::{get_by_path, Profile};
use serde_json::Value;

use crate::model::{CascadeField, CascadeGroup};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageValue {
    pub code: Option<String>,
    pub text: Option<String>,
}

impl StageValue {
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.text.is_none()
    }
}

/// Profile values one cascade run will use, resolved before the run starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadeValues {
    pub entry_index: Option<usize>,
    pub prereqs: Vec<(CascadeField, FieldValue)>,
    pub stages: Vec<StageValue>,
}

fn text_at(profile: &Profile, path: &str) -> Option<String> {
    get_by_path(profile, path)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string().trim().to_string())
}

impl CascadeValues {
    /// Values for `group`. An array root contributes its first entry that
    /// has any stage value; `None` when no entry has one.
    pub fn from_profile(group: &CascadeGroup, profile: &Profile) -> Option<Self> {
        let prefixes: Vec<(Option<usize>, String)> = match profile.raw(&group.root) {
            Some(Value::Array(items)) => (0..items.len())
                .map(|index| (Some(index), format!("{}.{index}", group.root)))
                .collect(),
            Some(Value::Object(_)) => vec![(None, group.root.clone())],
            _ => return None,
        };

        prefixes.into_iter().find_map(|(entry_index, prefix)| {
            let at = |rel: &str| format!("{prefix}.{rel}");
            let stages: Vec<StageValue> = group
                .stages
                .iter()
                .map(|stage| StageValue {
                    code: stage.code_path.as_deref().and_then(|p| text_at(profile, &at(p))),
                    text: stage.text_path.as_deref().and_then(|p| text_at(profile, &at(p))),
                })
                .collect();
            if stages.iter().all(StageValue::is_empty) {
                return None;
            }
            let prereqs = group
                .prereqs
                .iter()
                .filter_map(|field| {
                    get_by_path(profile, &at(&field.path))
                        .filter(|value| !value.is_empty())
                        .map(|value| (field.clone(), value))
                })
                .collect();
            Some(CascadeValues {
                entry_index,
                prereqs,
                stages,
            })
        })
    }
}
