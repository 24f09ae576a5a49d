use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillPolicy {
    pub enabled: bool,
    /// Follow input/change with blur, as leaving the field by hand would.
    pub dispatch_blur: bool,
    /// Compare option text with whitespace collapsed and trimmed.
    pub text_match_ignores_whitespace: bool,
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            dispatch_blur: true,
            text_match_ignores_whitespace: true,
        }
    }
}
