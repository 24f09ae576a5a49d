//! Configuration for the CLI shell.

use std::env;
use std::path::{Path, PathBuf};

use cascade_sequencer::CascadePolicy;
use fill_engine::FillPolicy;
use learning_engine::LearnOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

pub const STORE_ENV: &str = "ENTRYFILL_STORE";
pub const LOG_ENV: &str = "ENTRYFILL_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when neither `RUST_LOG` nor `ENTRYFILL_LOG` is set.
    pub level: Option<String>,
    pub json: bool,
    /// Directory for a daily rolling log file.
    pub dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryfillConfig {
    /// JSON blob holding the profile, patterns and saved settings.
    pub store_path: Option<PathBuf>,
    pub learn: LearnOptions,
    pub fill: FillPolicy,
    pub cascade: CascadePolicy,
    /// Keyword table YAML replacing the built-in one.
    pub keywords: Option<PathBuf>,
    pub log: LogConfig,
}

impl EntryfillConfig {
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).await.map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text, path)
    }

    /// `ENTRYFILL_STORE` wins over the file.
    pub fn apply_env(&mut self) {
        if let Some(store) = env::var_os(STORE_ENV).filter(|value| !value.is_empty()) {
            self.store_path = Some(PathBuf::from(store));
        }
    }

    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(default_store_path)
    }
}

/// Search order when no `--config` is given.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("config/entryfill.yaml")];
    if let Some(mut dir) = dirs::config_dir() {
        dir.push("entryfill");
        dir.push("config.yaml");
        candidates.push(dir);
    }
    candidates
}

pub fn default_store_path() -> PathBuf {
    match dirs::data_dir() {
        Some(mut dir) => {
            dir.push("entryfill");
            dir.push("store.json");
            dir
        }
        None => PathBuf::from("entryfill-store.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = EntryfillConfig::from_yaml(
            "store_path: /tmp/s.json\ncascade:\n  max_search_attempts: 5\nlearn:\n  short_value_keys: [sex]\n",
            Path::new("inline.yaml"),
        )
        .unwrap();
        assert_eq!(config.store_path.as_deref(), Some(Path::new("/tmp/s.json")));
        assert_eq!(config.cascade.max_search_attempts, 5);
        assert_eq!(config.cascade.poll_interval_ms, 250);
        assert_eq!(config.learn.short_value_keys, vec!["sex".to_string()]);
        assert!(config.fill.enabled);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let err = EntryfillConfig::from_yaml("cascade: [", Path::new("bad.yaml")).unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }
}
