// Rust guideline compliant 2026-10-17

//! Captally CLI Application
//!
//! Command-line interface for incremental capacity aggregation.

use captally_cli::{commands, logging, RepoContext};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "captally",
    version,
    about = "Captally: incremental aggregation of a versioned capacity log",
    long_about = "Captally folds every new Git revision of a JSON capacity log into a cumulative aggregate grouped by entity and day, then compacts days older than the retention window into summary statistics.",
    after_help = "Examples:\n  captally\n  captally run --dry-run\n  captally --repo ../fleet-data status --json\n"
)]
struct Cli {
    /// Repository directory (defaults to the current directory)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Custom config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Append logs to this file as JSON lines
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Fold new revisions, apply retention, and save the aggregate
    Run {
        /// Process everything but do not write the aggregate
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the cursor, aggregate size, and pending revisions
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init_tracing(&cli.log_level, cli.log_file.as_deref(), cli.json)?;
    let ctx = RepoContext::discover(cli.repo.as_deref(), cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => {
            commands::run::execute(&ctx, dry_run, cli.json)?;
        }
        Commands::Status => {
            commands::status::execute(&ctx, cli.json)?;
        }
    }

    Ok(())
}
