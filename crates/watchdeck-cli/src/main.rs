use clap::{ArgAction, Parser, Subcommand};
use commands::{auth, browse, clear, config, follow, watchlist, MediaKind};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "watchdeck")]
#[command(about = "Watchdeck - browse movies and shows, keep a synced watchlist")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to this file (daily rotation) instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the backend account
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and clear the saved session
    Logout,
    /// Manage the synced watchlist
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },
    /// Search movies and TV shows
    Search {
        /// Search query
        query: String,
    },
    /// Browse a catalog rail
    Browse {
        #[arg(value_enum)]
        rail: browse::Rail,
    },
    /// Show details for one title
    Details {
        #[arg(value_enum)]
        kind: MediaKind,

        /// Catalog identifier
        id: u64,
    },
    /// Watch the watchlist live, applying remote changes as they arrive
    #[command(long_about = "Keep the watchlist mirrored against the backend: loads it for the signed-in session, subscribes to the change feed, and re-fetches on every remote change until interrupted.")]
    Follow,
    /// Configure backend and catalog settings
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Clear saved credentials and logs
    Clear {
        /// Clear credentials and logs
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["credentials", "logs"])]
        all: bool,

        /// Clear the saved session tokens
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,

        /// Clear rotated log files
        #[arg(long, action = ArgAction::SetTrue)]
        logs: bool,
    },
}

#[derive(Subcommand)]
enum WatchlistCommands {
    /// Show the signed-in user's watchlist
    Show,
    /// Add a title by catalog id (title and poster are looked up)
    Add {
        #[arg(value_enum)]
        kind: MediaKind,
        id: u64,
    },
    /// Remove a title by catalog id
    Remove {
        #[arg(value_enum)]
        kind: MediaKind,
        id: u64,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks keys)
    Show {
        /// Show full configuration including keys
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Configure the backend project (URL + anon key)
    Backend {
        /// Project base URL (prompted when omitted)
        #[arg(long)]
        url: Option<String>,

        /// Project anon key (prompted when omitted)
        #[arg(long)]
        anon_key: Option<String>,
    },
    /// Configure the metadata catalog API key
    Catalog {
        /// Catalog API key (prompted when omitted)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Configure the change-feed poll interval
    Feed {
        /// Poll interval in seconds
        #[arg(long)]
        poll_interval: u64,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Login { email } => auth::run_login(email, &output).await,
        Commands::Logout => auth::run_logout(&output).await,
        Commands::Watchlist { cmd } => match cmd {
            WatchlistCommands::Show => watchlist::run_show(&output).await,
            WatchlistCommands::Add { kind, id } => watchlist::run_add(kind, id, &output).await,
            WatchlistCommands::Remove { kind, id } => {
                watchlist::run_remove(kind, id, &output).await
            }
        },
        Commands::Search { query } => browse::run_search(&query, &output).await,
        Commands::Browse { rail } => browse::run_browse(rail, &output).await,
        Commands::Details { kind, id } => browse::run_details(kind, id, &output).await,
        Commands::Follow => follow::run_follow(&output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Clear {
            all,
            credentials,
            logs,
        } => clear::run_clear(all, credentials, logs, &output).await,
    }
}
