use serde::{Deserialize, Serialize};

/// Tuning for a learning run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnOptions {
    /// Name stamped on the emitted pattern.
    pub pattern_name: String,
    /// Profile keys containing any of these tokens may match single-character values.
    pub short_value_keys: Vec<String>,
}

impl Default for LearnOptions {
    fn default() -> Self {
        Self {
            pattern_name: "learned".to_string(),
            short_value_keys: vec!["sex".into(), "kubun".into(), "kokushi".into()],
        }
    }
}

impl LearnOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            pattern_name: name.into(),
            ..Self::default()
        }
    }

    pub fn allows_short_value(&self, path: &str) -> bool {
        self.short_value_keys.iter().any(|token| path.contains(token.as_str()))
    }
}
