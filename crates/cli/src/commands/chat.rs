//! `personasmith chat` — read chat commands from stdin until EOF or `exit`.

use std::path::PathBuf;

use personasmith_commands::CommandError;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::commands::{build_handler, CLI_ORIGIN};
use crate::terminal::TerminalReplies;

const HELP: &str = "可用命令：
  /人格详情 <人格ID>
  /人格列表
  /人格更新 <人格ID> <更新要求>
输入 exit 退出。";

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let handler = build_handler(config_path).await?;

    println!("{HELP}\n");

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit" | "/exit" | "/quit") {
            break;
        }

        match handler.dispatch(line, CLI_ORIGIN, &TerminalReplies).await {
            Ok(()) => {}
            Err(CommandError::UnknownCommand(name)) => {
                println!("未知命令: {name}\n{HELP}\n");
            }
            Err(e) => {
                warn!(error = %e, "Command failed");
                eprintln!("  [Error] {e}");
            }
        }
    }

    Ok(())
}
