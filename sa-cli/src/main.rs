//! Simple Analytics CLI - query statistics, export data points and manage
//! websites from the terminal.
//!
//! Credentials come from the configuration file or the `SA_API_KEY` and
//! `SA_USER_ID` environment variables. Public websites can be queried
//! without any.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use sa_core::config::AppConfig;
use sa_core::error::SaResult;
use sa_core::logging;

/// Simple Analytics - privacy-first analytics from the command line.
#[derive(Parser)]
#[command(
    name = "simple-analytics",
    version,
    about = "Simple Analytics API client",
    long_about = "A command-line client for the Simple Analytics Stats, Export and Admin APIs.\n\
                  Set SA_API_KEY and SA_USER_ID (or run `config init`) to access private data."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show aggregated statistics for a website or page.
    Stats(commands::stats::StatsArgs),
    /// Show pageviews and visitors over time.
    Histogram(commands::stats::HistogramArgs),
    /// Show event counts.
    Events(commands::stats::EventsArgs),
    /// Export raw data points (requires credentials).
    Export(commands::export::ExportArgs),
    /// List, inspect and add websites (requires credentials).
    Websites {
        #[command(subcommand)]
        action: commands::websites::WebsitesAction,
    },
    /// Show or create the configuration file.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() -> SaResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => AppConfig::default_config_path().unwrap_or_else(|_| PathBuf::from("config.toml")),
    };
    let mut config = if config_path.exists() {
        AppConfig::load_from_file(&config_path)?
    } else {
        AppConfig::default()
    };
    config.apply_env();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    let _guard = match config.effective_log_dir() {
        Ok(log_dir) => Some(logging::init_logging(log_level, &log_dir, config.logging.json_output)?),
        Err(_) => {
            logging::init_console_logging(log_level);
            None
        }
    };

    debug!(
        "Simple Analytics CLI v{} (config: {})",
        sa_core::constants::APP_VERSION,
        config_path.display()
    );

    // Dispatch to command handlers
    match cli.command {
        Commands::Stats(args) => commands::stats::run_stats(&config, args, cli.format),
        Commands::Histogram(args) => commands::stats::run_histogram(&config, args, cli.format),
        Commands::Events(args) => commands::stats::run_events(&config, args, cli.format),
        Commands::Export(args) => commands::export::run(&config, args, cli.format),
        Commands::Websites { action } => commands::websites::run(&config, action, cli.format),
        Commands::Config { action } => {
            commands::config::run(&config, &config_path, action, cli.format)
        }
    }
}
