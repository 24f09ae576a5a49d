use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use pattern_store::PatternStore;
use serde_json::json;
use tokio::fs;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::emit;

#[derive(Args, Clone, Debug)]
pub struct PatternsArgs {
    #[command(subcommand)]
    pub action: PatternsAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum PatternsAction {
    /// List stored pattern names
    List,
    /// Print a stored pattern as JSON
    Show { name: String },
    /// Delete a stored pattern
    Delete { name: String },
    /// Store a hand-edited pattern file under a name
    Import { name: String, file: PathBuf },
    /// Write a stored pattern to a file
    Export { name: String, file: PathBuf },
}

pub async fn cmd_patterns(args: PatternsArgs, ctx: &CliContext) -> Result<()> {
    let store = ctx.store().await?;
    match args.action {
        PatternsAction::List => {
            let names = store.list().await?;
            let last = store.last_pattern();
            emit(ctx.output(), &json!({ "patterns": &names, "last_pattern": &last }), || {
                if names.is_empty() {
                    return "No stored patterns".to_string();
                }
                names
                    .iter()
                    .map(|name| {
                        if Some(name) == last.as_ref() {
                            format!("* {}", name)
                        } else {
                            format!("  {}", name)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        PatternsAction::Show { name } => {
            let Some(pattern) = store.get(&name).await? else {
                bail!("No pattern named '{}'", name);
            };
            println!("{}", pattern.to_json_pretty()?);
            Ok(())
        }
        PatternsAction::Delete { name } => {
            if !store.delete(&name).await? {
                bail!("No pattern named '{}'", name);
            }
            info!(pattern = %name, "pattern deleted");
            emit(ctx.output(), &json!({ "deleted": &name }), || {
                format!("Deleted '{}'", name)
            })
        }
        PatternsAction::Import { name, file } => {
            let text = fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let pattern = store.import(&name, &text).await?;
            emit(ctx.output(), &pattern, || {
                format!(
                    "Imported '{}': {} mapped fields, {} recorded controls",
                    name,
                    pattern.mapping.len(),
                    pattern.learned_fields.len()
                )
            })
        }
        PatternsAction::Export { name, file } => {
            let Some(pattern) = store.get(&name).await? else {
                bail!("No pattern named '{}'", name);
            };
            fs::write(&file, pattern.to_json_pretty()?)
                .await
                .with_context(|| format!("Failed to write {}", file.display()))?;
            emit(ctx.output(), &json!({ "exported": &name, "file": &file }), || {
                format!("Exported '{}' to {}", name, file.display())
            })
        }
    }
}
