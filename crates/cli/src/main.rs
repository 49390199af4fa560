//! Aideas CLI: the main entry point.
//!
//! Commands:
//! - `onboard` - Write a default config file
//! - `chat`    - Interactive chat or single-message mode
//! - `config`  - Show, validate, or locate the configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "aideas",
    about = "Aideas: chat bot bridge to a remote question-answering API",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of ~/.aideas/config.toml
    #[arg(short, long, global = true, env = "AIDEAS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Onboard,

    /// Chat with the bot
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Session id to chat under
        #[arg(short, long, default_value = "cli_session")]
        session: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved configuration as TOML
    Show,
    /// Check the configuration for problems
    Validate,
    /// Print the config file path
    Path,
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
        .init();

    let config_path = cli
        .config
        .unwrap_or_else(aideas_config::BotConfig::config_path);

    match cli.command {
        Commands::Onboard => commands::onboard::run(&config_path).await?,
        Commands::Chat { message, session } => {
            commands::chat::run(&config_path, message, session).await?
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(&config_path).await?,
            ConfigAction::Validate => commands::config_cmd::validate(&config_path).await?,
            ConfigAction::Path => commands::config_cmd::path(&config_path).await?,
        },
    }

    Ok(())
}
