use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use learning_engine::Pattern;
use parking_lot::RwLock;
use profile_model::Profile;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::blob::StoredBlob;
use crate::errors::{StoreError, StoreErrorKind};
use crate::store::PatternStore;

/// Persists the profile, every pattern and the saved settings as a single
/// JSON document. Each mutation rewrites the file through a sibling
/// temporary file.
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<StoredBlob>,
    writer: Mutex<()>,
}

impl JsonFileStore {
    /// Loads `path`, treating a missing or empty file as an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let blob = match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => StoredBlob::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                StoreError::new(StoreErrorKind::Corrupt(format!("{}: {err}", path.display())))
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => StoredBlob::default(),
            Err(err) => return Err(err.into()),
        };
        info!(path = %path.display(), patterns = blob.patterns.len(), "pattern store opened");
        Ok(Self {
            path,
            state: RwLock::new(blob),
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn blob(&self) -> StoredBlob {
        self.state.read().clone()
    }

    /// Stored profile merged over the template, or the bare template.
    pub fn profile(&self) -> Profile {
        self.state.read().profile_or_template()
    }

    pub async fn save_profile(&self, profile: Profile) -> Result<(), StoreError> {
        self.mutate(|blob| {
            blob.profile = Some(profile);
        })
        .await
    }

    pub fn last_pattern(&self) -> Option<String> {
        self.state.read().saved_settings.last_pattern.clone()
    }

    pub async fn set_last_pattern(&self, name: Option<String>) -> Result<(), StoreError> {
        self.mutate(|blob| {
            blob.saved_settings.last_pattern = name;
        })
        .await
    }

    async fn mutate<R>(&self, change: impl FnOnce(&mut StoredBlob) -> R) -> Result<R, StoreError> {
        let _guard = self.writer.lock().await;
        let (result, snapshot) = {
            let mut state = self.state.write();
            let result = change(&mut state);
            (result, state.clone())
        };
        self.persist(&snapshot).await?;
        Ok(result)
    }

    async fn persist(&self, blob: &StoredBlob) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(blob)
            .map_err(|err| StoreError::new(StoreErrorKind::Io(err.to_string())))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "pattern store persisted");
        Ok(())
    }
}

#[async_trait]
impl PatternStore for JsonFileStore {
    async fn get(&self, name: &str) -> Result<Option<Pattern>, StoreError> {
        Ok(self.state.read().patterns.get(name).cloned())
    }

    async fn set(&self, name: &str, pattern: Pattern) -> Result<(), StoreError> {
        if name.trim().is_empty() {
            return Err(StoreErrorKind::EmptyName.into());
        }
        let name = name.to_string();
        self.mutate(move |blob| {
            blob.patterns.insert(name, pattern);
        })
        .await
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.state.read().patterns.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        if !self.state.read().patterns.contains_key(name) {
            return Ok(false);
        }
        self.mutate(|blob| {
            let removed = blob.patterns.remove(name).is_some();
            if removed && blob.saved_settings.last_pattern.as_deref() == Some(name) {
                blob.saved_settings.last_pattern = None;
            }
            removed
        })
        .await
    }
}
