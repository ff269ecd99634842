//! reminder-warrior — one-way sync from Apple Reminders into Taskwarrior.
//!
//! # Usage
//!
//! ```text
//! reminder-warrior sync [--list <name> | --all] [--dry-run] [--progress] [--bulk] [--fail-fast]
//! reminder-warrior lists
//! reminder-warrior set-list [<name> | --all]
//! reminder-warrior reminders [--list <name> | --all]
//! reminder-warrior config [--dry-run]
//! reminder-warrior status [--json]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{
    config::ConfigArgs, lists::ListsArgs, reminders::RemindersArgs, set_list::SetListArgs,
    status::StatusArgs, sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "reminder-warrior",
    version,
    about = "Sync Apple Reminders into Taskwarrior",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Log debug detail to stderr.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Use this sync state file instead of `~/.reminder-warrior/sync-state.json`.
    #[arg(long, value_name = "PATH", global = true)]
    pub sync_state_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create Taskwarrior tasks for reminders that have not been synced yet.
    Sync(SyncArgs),

    /// Print the Reminders lists.
    #[command(alias = "list")]
    Lists(ListsArgs),

    /// Choose the default list (or all lists) used by `sync`.
    SetList(SetListArgs),

    /// Print the active reminders of the selected list(s).
    Reminders(RemindersArgs),

    /// Define the Taskwarrior attribute that stores reminder ids.
    Config(ConfigArgs),

    /// Summarise what has been synced so far.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = cli.global;
    match cli.command {
        Commands::Sync(args) => args.run(&global),
        Commands::Lists(args) => args.run(&global),
        Commands::SetList(args) => args.run(&global),
        Commands::Reminders(args) => args.run(&global),
        Commands::Config(args) => args.run(&global),
        Commands::Status(args) => args.run(&global),
    }
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
