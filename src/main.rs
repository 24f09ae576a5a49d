use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    entryfill_cli::cli::run().await
}
