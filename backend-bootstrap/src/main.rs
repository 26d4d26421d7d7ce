use anyhow::Result;
use clap::Parser;

use backend_bootstrap::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    backend_bootstrap::run(Cli::parse()).await
}
