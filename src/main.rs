//! # Text Insight CLI (`insight`)
//!
//! ## Usage
//!
//! ```bash
//! insight --config ./config/insight.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `insight init` | Create the SQLite database and schema |
//! | `insight analyze [TEXT]` | Analyze one text (argument, `--file`, or stdin) |
//! | `insight batch TEXT...` | Analyze up to 10 texts concurrently |
//! | `insight list` | Show stored analyses, newest first |
//! | `insight search` | Filter stored analyses by topic, keyword, sentiment |
//! | `insight get <id>` | Show one stored analysis in full |
//! | `insight lexicon` | Show the active offline lexicon |
//! | `insight serve` | Start the HTTP API server |
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG=info` (or
//! `debug`) to see them. Command output goes to stdout.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use text_insight::{analyze_cmd, config, get, migrate, search, server};

/// Text Insight: structured text analysis with an LLM upstream and a
/// deterministic offline fallback.
#[derive(Parser)]
#[command(
    name = "insight",
    about = "Text Insight: structured text analysis with an offline fallback",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/insight.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Analyze a single text.
    ///
    /// The text comes from the positional argument, from `--file`, or from
    /// stdin when neither is given.
    Analyze {
        text: Option<String>,

        /// Read the text from this file.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Print the result without storing it.
        #[arg(long)]
        no_save: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Analyze several texts at once (1 to 10).
    Batch {
        texts: Vec<String>,

        /// Read texts from this file, one per line.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Print the results without storing them.
        #[arg(long)]
        no_save: bool,
    },

    /// List stored analyses, newest first.
    List {
        /// Maximum rows to show (default 100, capped at 1000).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search stored analyses.
    ///
    /// Topic and keyword are case-insensitive substring matches; a record
    /// matching either is returned. Sentiment narrows the result.
    Search {
        #[arg(long)]
        topic: Option<String>,

        #[arg(long)]
        keyword: Option<String>,

        /// positive, neutral or negative.
        #[arg(long)]
        sentiment: Option<String>,

        /// Maximum rows to show (default 100, capped at 1000).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one stored analysis by id.
    Get { id: String },

    /// Show the lexicon used by the offline analyzer.
    Lexicon,

    /// Start the HTTP API server on `server.bind`.
    Serve,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Analyze {
            text,
            file,
            no_save,
            json,
        } => {
            analyze_cmd::run_analyze(&cfg, text, file, no_save, json).await?;
        }
        Commands::Batch {
            texts,
            file,
            no_save,
        } => {
            analyze_cmd::run_batch(&cfg, texts, file, no_save).await?;
        }
        Commands::List { limit } => {
            search::run_list(&cfg, limit).await?;
        }
        Commands::Search {
            topic,
            keyword,
            sentiment,
            limit,
        } => {
            search::run_search(&cfg, topic, keyword, sentiment, limit).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::Lexicon => {
            analyze_cmd::run_lexicon(&cfg)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
