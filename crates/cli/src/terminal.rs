//! Terminal reply sink.

use async_trait::async_trait;
use personasmith_core::error::ReplyError;
use personasmith_core::reply::ReplySink;
use tokio::io::{self, AsyncWriteExt};

/// Prints every reply to stdout, followed by a blank line.
#[derive(Debug, Default)]
pub struct TerminalReplies;

#[async_trait]
impl ReplySink for TerminalReplies {
    async fn send(&self, text: &str) -> Result<(), ReplyError> {
        let mut stdout = io::stdout();
        stdout
            .write_all(format!("{text}\n\n").as_bytes())
            .await
            .map_err(|e| ReplyError::DeliveryFailed(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| ReplyError::DeliveryFailed(e.to_string()))
    }
}
