//! Subcommand implementations and the wiring they share.

pub mod chat;
pub mod init;
pub mod persona;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use personasmith_commands::PersonaCommands;
use personasmith_config::AppConfig;
use personasmith_core::persona::PersonaStore;
use personasmith_store::{FilePersonaStore, InMemoryPersonaStore};
use tracing::debug;

/// Conversation origin for everything typed into this terminal.
pub const CLI_ORIGIN: &str = "cli";

fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Open the configured store.
///
/// The memory backend starts from a snapshot of the persona file, if one
/// exists, and never writes back to it.
async fn build_store(config: &AppConfig) -> Result<Arc<dyn PersonaStore>, Box<dyn std::error::Error>> {
    let path = config.store_path();
    match config.store.backend.as_str() {
        "memory" => {
            let personas = FilePersonaStore::new(path.clone()).get_all().await?;
            debug!(path = %path.display(), count = personas.len(), "Using in-memory persona store");
            Ok(Arc::new(InMemoryPersonaStore::with_personas(personas)))
        }
        _ => {
            debug!(path = %path.display(), "Using file persona store");
            Ok(Arc::new(FilePersonaStore::new(path)))
        }
    }
}

/// Build the command handler from configuration.
async fn build_handler(config_path: Option<PathBuf>) -> Result<PersonaCommands, Box<dyn std::error::Error>> {
    let config = load_config(config_path.as_deref())?;
    debug!(?config, "Loaded configuration");

    let store = build_store(&config).await?;
    let router = Arc::new(personasmith_providers::build_from_config(&config));

    Ok(PersonaCommands::from_config(store, router, &config))
}
