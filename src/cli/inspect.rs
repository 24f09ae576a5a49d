use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::cli::context::CliContext;
use crate::cli::output::emit;
use crate::cli::runtime::load_page;

#[derive(Args, Clone, Debug)]
pub struct InspectArgs {
    /// Page snapshot (JSON) to inspect
    pub page: PathBuf,
}

pub async fn cmd_inspect(args: InspectArgs, ctx: &CliContext) -> Result<()> {
    let page = load_page(&args.page).await?;
    let controls = ctx.engine().inspect(&page);
    emit(ctx.output(), &controls, || {
        if controls.is_empty() {
            return "No data controls found".to_string();
        }
        controls
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    })
}
