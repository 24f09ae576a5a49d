use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use learning_engine::Pattern;
use page_model::Page;
use pattern_store::PatternStore;
use tracing::{info, warn};

use crate::cli::context::CliContext;
use crate::cli::output::emit;
use crate::cli::runtime::{load_page, read_profile, save_page};

#[derive(Args, Clone, Debug)]
pub struct FillArgs {
    /// Page snapshot (JSON) to fill
    pub page: PathBuf,

    /// Pattern to replay; defaults to the last one learned or used
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Profile to fill from instead of the stored one
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Wait for the dependent-select cascade to finish before reporting
    #[arg(long)]
    pub wait_cascade: bool,

    /// Write the filled page snapshot here
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

pub async fn cmd_fill(args: FillArgs, ctx: &CliContext) -> Result<()> {
    let page = load_page(&args.page).await?;
    let store = ctx.store().await?;
    let profile = match &args.profile {
        Some(path) => read_profile(path).await?.merged_over_template(),
        None => store.profile(),
    };

    let name = args
        .pattern
        .clone()
        .or_else(|| store.last_pattern())
        .unwrap_or_else(|| Pattern::DEFAULT_NAME.to_string());
    let pattern = match store.get(&name).await? {
        Some(pattern) => pattern,
        None if name == Pattern::DEFAULT_NAME => Pattern::heuristic_default(),
        None => {
            warn!(pattern = %name, "pattern not found, falling back to heuristics");
            Pattern::heuristic_default()
        }
    };

    let shared: Arc<dyn Page> = Arc::new(page.clone());
    let report = ctx.engine().fill(shared, &profile, &pattern);
    let summary = if args.wait_cascade {
        report.settled_summary().await
    } else {
        report.summary()
    };
    for issue in &summary.issues {
        warn!(kind = issue.kind_label(), "{}", issue);
    }

    if name != Pattern::DEFAULT_NAME && !pattern.is_heuristic_only() {
        store
            .set_last_pattern(Some(name.clone()))
            .await
            .context("Failed to remember the pattern")?;
    }
    if let Some(out) = &args.out {
        save_page(&page, out).await?;
        info!(path = %out.display(), "filled page written");
    }

    emit(ctx.output(), &summary, || {
        let mut text = format!(
            "Filled {} fields with '{}'",
            summary.filled_count, summary.adapter
        );
        if let Some(pattern) = &summary.pattern {
            text.push_str(&format!(" (pattern '{}')", pattern));
        }
        if let Some(cascade) = &summary.cascade {
            text.push_str(&format!("\ncascade {}: {:?}", cascade.group, cascade.state));
        }
        for issue in &summary.issues {
            text.push_str(&format!("\n  ! {}", issue));
        }
        text
    })
}
