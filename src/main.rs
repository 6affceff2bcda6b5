mod commands;

use std::path::PathBuf;

use anyhow::Result;
use bdaycal_core::BdayCalConfig;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bdaycal")]
#[command(about = "Birthdays and anniversaries from your contacts, as a calendar")]
struct Cli {
    /// Config file (default: ~/.config/bdaycal/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List upcoming birthdays and anniversaries
    List {
        /// Print the attribute records as JSON
        #[arg(long)]
        json: bool,

        /// Count from this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Write upcoming events as an .ics calendar
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Count from this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Verify credentials and show the discovered address books
    Check,
    /// Refresh periodically until interrupted
    Watch {
        /// Time between refreshes, e.g. "30m" (default: update_interval from config)
        #[arg(long, value_parser = humantime::parse_duration)]
        interval: Option<std::time::Duration>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = BdayCalConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::List { json, date } => commands::list::run(&config, date, json).await,
        Commands::Export { output, date } => commands::export::run(&config, date, output).await,
        Commands::Check => commands::check::run(&config).await,
        Commands::Watch { interval } => commands::watch::run(&config, interval).await,
    }
}

/// Logs go to stderr so `list --json` and `export` output stays clean.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
