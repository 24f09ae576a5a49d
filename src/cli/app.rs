use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_config, load_keywords, LoadedConfig, LogSettings};
use crate::engine::AutofillEngine;

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let LoadedConfig { mut config, path } = load_config(cli.config.as_ref()).await?;
    if let Some(store) = &cli.store {
        config.store_path = Some(store.clone());
    }

    let _log_guard = init_logging(LogSettings {
        level: cli.log_level.as_deref(),
        configured: config.log.level.as_deref(),
        debug: cli.debug,
        json: cli.log_json || config.log.json,
        dir: cli.log_dir.as_deref().or(config.log.dir.as_deref()),
    })?;

    info!("Starting entryfill v{}", env!("CARGO_PKG_VERSION"));
    match &path {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    let keywords = load_keywords(&config).await?;
    let engine = AutofillEngine::new(&config, keywords);
    let cli_context = CliContext::new(config, path, cli.output.clone(), engine);

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
