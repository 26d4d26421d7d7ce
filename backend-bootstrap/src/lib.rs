pub mod cli;
pub mod context;
pub mod lifecycle;
pub mod logging;

pub use cli::{Cli, Command};
pub use lifecycle::{run_cleanup, run_import, run_report, run_server};

use anyhow::Result;

use backend_infrastructure::AppConfig;

use crate::context::AppContext;

pub async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path).await?,
        None => AppConfig::load().await?,
    };
    let _log_guard = logging::init_logging(config.log_dir.as_deref());

    let context = AppContext::new(config).await?;
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(context).await,
        Command::Import(args) => run_import(context, args).await,
        Command::Cleanup(args) => run_cleanup(context, args).await,
        Command::Report(args) => run_report(context, args).await,
    }
}
