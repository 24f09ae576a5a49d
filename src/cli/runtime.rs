use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use page_model::{MemoryPage, PageSnapshot};
use profile_model::Profile;
use site_adapters::KeywordTable;
use tokio::fs;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{config_candidates, EntryfillConfig, LOG_ENV};

pub struct LogSettings<'a> {
    /// From `--log-level`.
    pub level: Option<&'a str>,
    /// From the config file; `ENTRYFILL_LOG` overrides it.
    pub configured: Option<&'a str>,
    pub debug: bool,
    pub json: bool,
    pub dir: Option<&'a Path>,
}

/// Installs the global subscriber. `RUST_LOG` wins, then `--debug` or
/// `--log-level`, then `ENTRYFILL_LOG`, then the config file, then `info`. Logs go to stderr
/// so machine output on stdout stays clean. Keep the returned guard alive
/// for the file writer to flush.
pub fn init_logging(settings: LogSettings<'_>) -> Result<Option<WorkerGuard>> {
    let directive = if settings.debug {
        "debug".to_string()
    } else {
        settings
            .level
            .map(str::to_string)
            .or_else(|| env::var(LOG_ENV).ok().filter(|value| !value.trim().is_empty()))
            .or_else(|| settings.configured.map(str::to_string))
            .unwrap_or_else(|| "info".to_string())
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&directive).context("Invalid log level")?,
    };

    let (file_writer, guard) = match settings.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "entryfill.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with((!settings.json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(settings.json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with(file_writer.map(|writer| fmt::layer().with_ansi(false).with_writer(writer)))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

pub struct LoadedConfig {
    pub config: EntryfillConfig,
    pub path: Option<PathBuf>,
}

/// Priority: `--config` > ./config/entryfill.yaml > <config dir>/entryfill/config.yaml.
/// An explicit path must exist; otherwise defaults apply.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let path = match config_path {
        Some(path) => Some(path.clone()),
        None => config_candidates().into_iter().find(|candidate| candidate.exists()),
    };
    let mut config = match &path {
        Some(path) => EntryfillConfig::from_file(path)
            .await
            .context("Failed to load config file")?,
        None => EntryfillConfig::default(),
    };
    config.apply_env();
    Ok(LoadedConfig { config, path })
}

pub async fn load_keywords(config: &EntryfillConfig) -> Result<KeywordTable> {
    let Some(path) = &config.keywords else {
        return Ok(KeywordTable::builtin());
    };
    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read keyword table {}", path.display()))?;
    let table = KeywordTable::from_yaml(&text)
        .with_context(|| format!("Invalid keyword table {}", path.display()))?;
    info!(path = %path.display(), fields = table.fields.len(), "Loaded keyword table");
    Ok(table)
}

pub async fn load_page(path: &Path) -> Result<MemoryPage> {
    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read page {}", path.display()))?;
    let snapshot = PageSnapshot::from_json(&text)
        .with_context(|| format!("Invalid page snapshot {}", path.display()))?;
    Ok(MemoryPage::from_snapshot(&snapshot))
}

pub async fn save_page(page: &MemoryPage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let json = page.snapshot().to_json_pretty()?;
    fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write page {}", path.display()))
}

pub async fn read_profile(path: &Path) -> Result<Profile> {
    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    Profile::from_json(&text).with_context(|| format!("Invalid profile {}", path.display()))
}
