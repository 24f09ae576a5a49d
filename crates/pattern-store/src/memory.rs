use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use learning_engine::Pattern;
use parking_lot::RwLock;

use crate::errors::{StoreError, StoreErrorKind};
use crate::store::PatternStore;

#[derive(Clone, Default)]
pub struct MemoryPatternStore {
    inner: Arc<RwLock<HashMap<String, Pattern>>>,
}

impl MemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[async_trait]
impl PatternStore for MemoryPatternStore {
    async fn get(&self, name: &str) -> Result<Option<Pattern>, StoreError> {
        Ok(self.inner.read().get(name).cloned())
    }

    async fn set(&self, name: &str, pattern: Pattern) -> Result<(), StoreError> {
        if name.trim().is_empty() {
            return Err(StoreErrorKind::EmptyName.into());
        }
        self.inner.write().insert(name.to_string(), pattern);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self.inner.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.inner.write().remove(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_import_keeps_previous_pattern() {
        let store = MemoryPatternStore::new();
        store
            .import("site", r##"{"mapping": {"email": "#mail"}}"##)
            .await
            .unwrap();
        assert!(store.import("site", "{not json").await.is_err());

        let kept = store.get("site").await.unwrap().unwrap();
        assert!(kept.mapping.contains_key("email"));
        assert_eq!(store.list().await.unwrap(), vec!["site".to_string()]);
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let store = MemoryPatternStore::new();
        store.set("a", Pattern::new("a")).await.unwrap();
        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert!(store.is_empty());
    }
}
