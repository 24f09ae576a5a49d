use super::env::CliArgs;
use super::fill::cmd_fill;
use super::inspect::cmd_inspect;
use super::learn::cmd_learn;
use super::patterns::cmd_patterns;
use super::profile::cmd_profile;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Learn(args) => cmd_learn(args, ctx).await,
        Commands::Fill(args) => cmd_fill(args, ctx).await,
        Commands::Inspect(args) => cmd_inspect(args, ctx).await,
        Commands::Patterns(args) => cmd_patterns(args, ctx).await,
        Commands::Profile(args) => cmd_profile(args, ctx).await,
    }
}
