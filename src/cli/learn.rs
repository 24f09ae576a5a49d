use std::path::PathBuf;
use anyhow::Result;
use clap::Args;
use learning_engine::{LearnStatus, Pattern};
use pattern_store::{JsonFileStore, PatternStore};
use tracing::{info, warn};

use crate::cli::context::CliContext;
use crate::cli::output::emit;
use crate::cli::runtime::{load_page, read_profile};

#[derive(Args, Clone, Debug)]
pub struct LearnArgs {
    /// Page snapshot (JSON) filled in by hand
    pub page: PathBuf,

    /// Name to store the pattern under
    #[arg(short, long, default_value = "default")]
    pub name: String,

    /// Profile to match against instead of the stored one
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Print the pattern without storing it
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn cmd_learn(args: LearnArgs, ctx: &CliContext) -> Result<()> {
    let page = load_page(&args.page).await?;
    let store = ctx.store().await?;
    let profile = match &args.profile {
        Some(path) => read_profile(path).await?.merged_over_template(),
        None => store.profile(),
    };

    let report = ctx.engine().learn(&page, &profile, &args.name);
    for issue in &report.issues {
        warn!(kind = issue.kind_label(), "{}", issue);
    }

    if let LearnStatus::NoMatch { instruction } = &report.status {
        warn!(pattern = %args.name, "nothing learned");
        return emit(ctx.output(), &report, || instruction.clone());
    }

    if !args.dry_run {
        persist(&store, &args.name, &report.pattern).await?;
        info!(pattern = %args.name, matched = report.match_count, "pattern stored");
    }

    emit(ctx.output(), &report, || {
        format!(
            "Learned '{}': {} profile fields mapped, {} controls recorded{}",
            args.name,
            report.match_count,
            report.pattern.learned_fields.len(),
            if args.dry_run { " (not stored)" } else { "" }
        )
    })
}

async fn persist(store: &JsonFileStore, name: &str, pattern: &Pattern) -> Result<()> {
    store.set(name, pattern.clone()).await?;
    store.set_last_pattern(Some(name.to_string())).await?;
    Ok(())
}
