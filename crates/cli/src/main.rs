//! Handbook Agent CLI
//!
//! Main entry point for the `handbook` command-line tool: a chat interface
//! over the student handbook corpus with tiered web-search fallback and a
//! self-growing knowledge base.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, SeedCommand, StatsCommand};
use handbook_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Handbook Agent CLI - handbook Q&A with tiered retrieval
#[derive(Parser, Debug)]
#[command(name = "handbook")]
#[command(about = "Ask questions about the student handbook", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./handbook.yaml)
    #[arg(short, long, global = true, env = "HANDBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the vector index database
    #[arg(short, long, global = true, env = "HANDBOOK_INDEX")]
    index: Option<PathBuf>,

    /// Similarity threshold for corpus matches (0.0-1.0)
    #[arg(short, long, global = true)]
    threshold: Option<f32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive chat session
    Chat(ChatCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Load the handbook corpus into the index
    Seed(SeedCommand),

    /// Show index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Pick up credentials from a local .env before reading config
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.config,
        cli.index,
        cli.threshold,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Handbook Agent CLI starting");
    tracing::debug!("Index: {:?}", config.index_path);
    tracing::debug!("Scope domain: {}", config.search.scope_domain);

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Seed(_) => "seed",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Seed(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
