use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use xinyue_core::backend::SearchTarget;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "xinyue")]
#[command(about = "Xinyue - cloud-drive resource search with paginated transfers", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Identity that owns the search session and rate-limit window
    #[arg(long, global = true, default_value = "cli")]
    identity: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search once and print the first page
    Search {
        keyword: String,
        /// Drive to search (quark, baidu, uc, xunlei) or "all"
        #[arg(long, short, default_value_t = SearchTarget::default())]
        target: SearchTarget,
    },
    /// Search the service's own index
    Local { keyword: String },
    /// Interactive session with paging and transfers (default)
    Repl,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let engine = commands::build_engine(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Search { keyword, target } => {
            commands::search::run(&engine, &cli.identity, &keyword, target).await
        }
        Commands::Local { keyword } => {
            commands::search::run_local(&engine, &cli.identity, &keyword).await
        }
        Commands::Repl => commands::repl::run(&engine, &cli.identity).await,
    }
}
