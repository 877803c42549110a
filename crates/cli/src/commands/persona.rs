//! `personasmith detail | list | update` — run one chat command.

use std::path::PathBuf;

use crate::commands::{build_handler, CLI_ORIGIN};
use crate::terminal::TerminalReplies;

pub async fn run(config_path: Option<PathBuf>, line: String) -> Result<(), Box<dyn std::error::Error>> {
    let handler = build_handler(config_path).await?;
    handler.dispatch(&line, CLI_ORIGIN, &TerminalReplies).await?;
    Ok(())
}
