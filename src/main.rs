use anyhow::Result;
use parlor::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
