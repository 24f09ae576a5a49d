use std::collections::BTreeMap;

use learning_engine::Pattern;
use profile_model::Profile;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedSettings {
    #[serde(default, alias = "lastPattern", skip_serializing_if = "Option::is_none")]
    pub last_pattern: Option<String>,
}

/// Everything the file store persists, as one document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredBlob {
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub patterns: BTreeMap<String, Pattern>,
    #[serde(default, alias = "savedSettings")]
    pub saved_settings: SavedSettings,
}

impl StoredBlob {
    /// Profile with template defaults filled in.
    pub fn profile_or_template(&self) -> Profile {
        match &self.profile {
            Some(profile) => profile.merged_over_template(),
            None => Profile::template(),
        }
    }
}
