//! Brio Control - CLI for Brio
//!
//! Chat through a creative block, inspect the classifiers, and look at what
//! Brio remembers.

use anyhow::Result;
use brioctl::config::BrioConfig;
use brioctl::{commands, logging};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

// Version is embedded at build time
const VERSION: &str = env!("BRIO_VERSION");

#[derive(Parser)]
#[command(name = "brioctl")]
#[command(about = "Brio - a short conversation to get unstuck on creative work", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    /// Config file (overrides $BRIO_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User id for memory and week files
    #[arg(long, global = true)]
    user: Option<String>,

    /// Tracing filter, e.g. "debug" or "brio_common=debug"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a conversation (default)
    Chat {
        /// Fixed seed for deterministic selection
        #[arg(long)]
        seed: Option<u64>,

        /// Keep nothing on disk
        #[arg(long)]
        ephemeral: bool,

        /// Print all lines at once
        #[arg(long)]
        no_pacing: bool,
    },

    /// Run the classifiers on a text
    Classify {
        /// Text to analyse
        #[arg(required = true)]
        text: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show long-term memory stats
    Stats,

    /// Show the 7-day plan in progress
    Week {
        /// Drop the plan in progress
        #[arg(long)]
        reset: bool,
    },

    /// List the protocol catalog
    Protocols,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = BrioConfig::load(cli.config.as_deref());
    let level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "warn".to_string());
    logging::init(&level);

    let mut config = loaded.unwrap_or_else(|e| {
        warn!("Invalid config, using defaults: {:#}", e);
        BrioConfig::default()
    });
    if let Some(user) = cli.user {
        config.user = user;
    }

    match cli.command.unwrap_or(Commands::Chat {
        seed: None,
        ephemeral: false,
        no_pacing: false,
    }) {
        Commands::Chat {
            seed,
            ephemeral,
            no_pacing,
        } => {
            if seed.is_some() {
                config.seed = seed;
            }
            commands::chat(&config, ephemeral, no_pacing).await
        }
        Commands::Classify { text, json } => commands::classify(&text.join(" "), json),
        Commands::Stats => commands::stats(&config),
        Commands::Week { reset } => commands::week(&config, reset),
        Commands::Protocols => commands::protocols(),
    }
}
