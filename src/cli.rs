//! Command-line interface for dropwatch.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Extra configuration file layered over config/default and config/local
    #[arg(short, long, global = true, env = "DROPWATCH_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check every product once and exit
    Run(BatchArgs),

    /// Re-check the product list on a cron schedule until interrupted
    Watch {
        #[command(flatten)]
        batch: BatchArgs,

        /// Six-field cron expression; overrides scheduler.cron
        #[arg(long)]
        cron: Option<String>,
    },

    /// Run the page extractor over a saved HTML file and print what it finds
    Extract {
        /// Path to the saved product page
        page: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Product list (.json or .toml)
    #[arg(short, long, env = "DROPWATCH_PRODUCTS")]
    pub products: PathBuf,

    /// Maximum number of products checked at the same time
    #[arg(short = 'n', long)]
    pub concurrency: Option<usize>,

    /// Log alerts instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}
