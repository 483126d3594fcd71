//! workmatch CLI.
//!
//! Commands:
//! - `classify`: Identifier vs. descriptive verdict for a piece of text
//! - `rank`: One-shot ranking of work history against given fields
//! - `replay`: Drive a recorded transcript through the intake agent
//! - `status`: Show configuration and store status
//! - `onboard`: Write the default configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "workmatch",
    about = "workmatch: maintenance request intake and work-history matching",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify text as an identifier lookup or a description
    Classify {
        text: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Rank historical work records against the given fields
    Rank {
        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        equipment: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        item_id: Option<String>,

        /// Keep only candidates with exactly this priority
        #[arg(long)]
        only_priority: Option<String>,

        /// Look up --item-id directly instead of ranking
        #[arg(long)]
        exact: bool,

        /// Read records from this JSONL file instead of the configured store
        #[arg(long, env = "WORKMATCH_RECORDS")]
        records: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Replay a JSONL transcript of `{"utterance", "fields"}` turns
    Replay {
        transcript: PathBuf,

        /// Read records from this JSONL file instead of the configured store
        #[arg(long, env = "WORKMATCH_RECORDS")]
        records: Option<PathBuf>,

        /// Mark the session completed after the last turn
        #[arg(long)]
        finalize: bool,
    },

    /// Show configuration and store status
    Status,

    /// Write the default configuration file
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Classify { text, json } => commands::classify::run(&text, json)?,
        Commands::Rank {
            location,
            equipment,
            status,
            priority,
            item_id,
            only_priority,
            exact,
            records,
            json,
        } => {
            let query = commands::rank::query_from_flags(location, equipment, status, priority, item_id);
            let options = commands::rank::RankOptions {
                only_priority,
                exact,
                json,
            };
            commands::rank::run(query, records, options).await?
        }
        Commands::Replay {
            transcript,
            records,
            finalize,
        } => commands::replay::run(&transcript, records, finalize).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Onboard => commands::onboard::run()?,
    }

    Ok(())
}
