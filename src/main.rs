use anyhow::Result;
use clap::{Parser, Subcommand};

use vitalboard::cli;

#[derive(Debug, Parser)]
#[command(name = "vitalboard")]
#[command(about = "Health program dashboard: member profile, metrics, activity and conversation generation")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load the dashboard and print it to the terminal
    Show {
        /// Open the details of recent-activity entry N (1-based)
        #[arg(long)]
        event: Option<usize>,
    },
    /// Serve the dashboard over HTTP
    Serve {
        /// Listen address (default: web.addr from config)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Ask the backend to generate new conversations
    Generate,
    /// Check config, backend and Ollama reachability
    Health,
    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Summarize recent dashboard loads from the load log
    Log {
        /// Number of most recent entries to read
        #[arg(long, default_value = "50")]
        limit: usize,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective (merged) configuration
    Show,
    /// Write a default config file to ~/.vitalboard/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value by dotted key, e.g. `backend.member_id 2`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Show { event } => cli::run_show(event),
        Commands::Serve { addr } => cli::run_serve(addr),
        Commands::Generate => cli::run_generate(),
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
        Commands::Log { limit } => cli::run_log(limit),
    }
}
