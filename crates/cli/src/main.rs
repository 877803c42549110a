//! personasmith CLI — the main entry point.
//!
//! Commands:
//! - `init`    — Write a default config file
//! - `detail`  — Show one persona
//! - `list`    — Show every persona
//! - `update`  — Update a persona from a natural-language requirement
//! - `chat`    — Read chat commands from stdin

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod terminal;

#[derive(Parser)]
#[command(
    name = "personasmith",
    about = "personasmith — update AI personas by talking to an LLM",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.personasmith/config.toml
    #[arg(short, long, global = true, env = "PERSONASMITH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Show one persona
    Detail {
        /// Persona ID
        persona_id: String,
    },

    /// Show every persona
    List,

    /// Update a persona through the LLM agent
    Update {
        /// Persona ID
        persona_id: String,

        /// What to change, in natural language
        #[arg(required = true, trailing_var_arg = true)]
        requirement: Vec<String>,
    },

    /// Read chat commands (人格详情 / 人格列表 / 人格更新) from stdin
    Chat,
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

    let config_path = cli.config;

    match cli.command {
        Commands::Init => commands::init::run(config_path).await?,
        Commands::Detail { persona_id } => {
            commands::persona::run(config_path, format!("人格详情 {persona_id}")).await?
        }
        Commands::List => commands::persona::run(config_path, "人格列表".to_string()).await?,
        Commands::Update {
            persona_id,
            requirement,
        } => {
            let line = format!("人格更新 {persona_id} {}", requirement.join(" "));
            commands::persona::run(config_path, line).await?
        }
        Commands::Chat => commands::chat::run(config_path).await?,
    }

    Ok(())
}
