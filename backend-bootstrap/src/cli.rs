use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "btag-tracker")]
#[command(about = "BTag affiliate activity tracker", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Import one spreadsheet into the daily store
    Import(ImportArgs),
    /// Drop stored days older than the retention window
    Cleanup(CleanupArgs),
    /// Write an HTML activity report
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[arg(long)]
    pub file: PathBuf,
    /// Defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub tag: String,
    #[arg(long)]
    pub tag_filter: Option<String>,
    #[arg(long)]
    pub add_new_members: bool,
}

#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Falls back to `retention_days` from the config
    #[arg(long)]
    pub retention_days: Option<u32>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[arg(long)]
    pub start: NaiveDate,
    #[arg(long)]
    pub end: NaiveDate,
    #[arg(long)]
    pub active_only: bool,
    /// Output file; defaults to `<report_dir>/<start>_<end>.html`
    #[arg(long)]
    pub out: Option<PathBuf>,
}
