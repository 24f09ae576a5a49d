use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use profile_model::Profile;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::runtime::read_profile;

#[derive(Args, Clone, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ProfileAction {
    /// Print the empty profile template
    Template,
    /// Print the stored profile (template-merged)
    Show,
    /// Replace the stored profile with a JSON file
    Set { file: PathBuf },
}

pub async fn cmd_profile(args: ProfileArgs, ctx: &CliContext) -> Result<()> {
    match args.action {
        ProfileAction::Template => {
            println!("{}", Profile::template().to_json_pretty()?);
        }
        ProfileAction::Show => {
            let store = ctx.store().await?;
            println!("{}", store.profile().to_json_pretty()?);
        }
        ProfileAction::Set { file } => {
            let profile = read_profile(&file).await?;
            let store = ctx.store().await?;
            store.save_profile(profile).await?;
            info!(path = %store.path().display(), "profile stored");
            println!("Profile stored in {}", store.path().display());
        }
    }
    Ok(())
}
