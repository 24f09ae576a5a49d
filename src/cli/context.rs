use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use pattern_store::JsonFileStore;
use tokio::sync::OnceCell;

use crate::cli::output::OutputFormat;
use crate::config::EntryfillConfig;
use crate::engine::AutofillEngine;

pub struct CliContext {
    config: Arc<EntryfillConfig>,
    config_path: Option<PathBuf>,
    output: OutputFormat,
    engine: AutofillEngine,
    store: OnceCell<Arc<JsonFileStore>>,
}

impl CliContext {
    pub fn new(
        config: EntryfillConfig,
        config_path: Option<PathBuf>,
        output: OutputFormat,
        engine: AutofillEngine,
    ) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            output,
            engine,
            store: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &EntryfillConfig {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn output(&self) -> &OutputFormat {
        &self.output
    }

    pub fn engine(&self) -> &AutofillEngine {
        &self.engine
    }

    /// Opens the store on first use.
    pub async fn store(&self) -> Result<Arc<JsonFileStore>> {
        self.store
            .get_or_try_init(|| async {
                let path = self.config.resolved_store_path();
                JsonFileStore::open(&path)
                    .await
                    .map(Arc::new)
                    .with_context(|| format!("failed to open store {}", path.display()))
            })
            .await
            .map(Arc::clone)
    }
}
