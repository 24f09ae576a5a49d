use async_trait::async_trait;
use learning_engine::Pattern;
use serde_json::{json, Value};
use tracing::warn;

use crate::errors::{StoreError, StoreErrorKind};

#[async_trait]
pub trait PatternStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<Pattern>, StoreError>;

    async fn set(&self, name: &str, pattern: Pattern) -> Result<(), StoreError>;

    /// Stored pattern names, sorted.
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Returns whether a pattern was removed.
    async fn delete(&self, name: &str) -> Result<bool, StoreError>;

    /// Stores a hand-edited pattern under `name`. On a parse failure the
    /// previously stored pattern stays in place.
    async fn import(&self, name: &str, json: &str) -> Result<Pattern, StoreError> {
        let pattern = match parse_import(name, json) {
            Ok(pattern) => pattern,
            Err(err) => {
                warn!(pattern = name, error = %err, "import rejected");
                return Err(err);
            }
        };
        self.set(name, pattern.clone()).await?;
        Ok(pattern)
    }
}

/// Parses pattern JSON, tolerating a missing `metadata` block. The stored
/// name always wins over any name inside the document.
pub fn parse_import(name: &str, json: &str) -> Result<Pattern, StoreError> {
    if name.trim().is_empty() {
        return Err(StoreErrorKind::EmptyName.into());
    }
    let malformed = |reason: String| {
        StoreError::new(StoreErrorKind::MalformedPattern {
            name: name.to_string(),
            reason,
        })
    };
    let mut value: Value = serde_json::from_str(json).map_err(|err| malformed(err.to_string()))?;
    let Some(object) = value.as_object_mut() else {
        return Err(malformed("pattern must be a JSON object".to_string()));
    };
    object
        .entry("metadata")
        .or_insert_with(|| json!({ "name": name }));
    let mut pattern: Pattern = serde_json::from_value(value).map_err(|err| malformed(err.to_string()))?;
    pattern.metadata.name = name.to_string();
    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_accepts_bare_mapping() {
        let pattern = parse_import("site", r##"{"mapping": {"email": "#mail"}}"##).unwrap();
        assert_eq!(pattern.name(), "site");
        assert_eq!(pattern.mapping.len(), 1);
    }

    #[test]
    fn import_reports_malformed_pattern() {
        let err = parse_import("site", r#"{"mapping": {"email": 12}}"#).unwrap_err();
        assert!(matches!(err.kind(), StoreErrorKind::MalformedPattern { name, .. } if name == "site"));
        assert!(err.issue().is_some());

        let err = parse_import("site", "[1, 2]").unwrap_err();
        assert!(matches!(err.kind(), StoreErrorKind::MalformedPattern { .. }));
    }
}
