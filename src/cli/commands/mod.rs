//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod helpers;
mod init;
mod list;
mod recommend;
mod search;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "novelmind")]
#[command(about = "Novel catalog crawler and similarity recommender")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config and NOVELMIND_DATABASE)
    #[arg(long, short = 'd', global = true)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog database
    Init,

    /// Look a title up in the catalog, crawling it if unknown
    Search {
        /// Title to search for
        title: String,
        /// Fill fields a re-crawl misses from the stored entry
        #[arg(long)]
        merge: bool,
    },

    /// Recommend entries similar to a stored entry
    Recommend {
        /// Target entry id
        id: i64,
        /// Maximum number of recommendations (1-50)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List stored entries, optionally filtered by title or author
    List {
        /// Keyword matched against title and author
        keyword: Option<String>,
        /// Maximum number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Start the JSON API server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default from config)
        bind: Option<String>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        database: cli.database,
    };
    let settings = load_settings_with_options(&options)?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings),
        Commands::Search { title, merge } => search::cmd_search(&settings, &title, merge).await,
        Commands::Recommend { id, limit } => recommend::cmd_recommend(&settings, id, limit).await,
        Commands::List { keyword, limit } => list::cmd_list(&settings, keyword.as_deref(), limit),
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
    }
}
