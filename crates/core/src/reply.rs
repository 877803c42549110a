//! Reply sink — where command output goes.
//!
//! The command handler streams several replies per command (an interim
//! acknowledgment, then the result). Front ends implement this trait to
//! deliver them: the terminal prints, tests collect.

use async_trait::async_trait;
use std::sync::Mutex;
use crate::error::ReplyError;

#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Deliver one plain-text reply.
    async fn send(&self, text: &str) -> Result<(), ReplyError>;
}

/// A sink that keeps every reply in memory, in order.
#[derive(Debug, Default)]
pub struct BufferedReplies {
    replies: Mutex<Vec<String>>,
}

impl BufferedReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the replies received so far.
    pub fn replies(&self) -> Vec<String> {
        self.replies
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// The most recent reply, if any.
    pub fn last(&self) -> Option<String> {
        self.replies().pop()
    }
}

#[async_trait]
impl ReplySink for BufferedReplies {
    async fn send(&self, text: &str) -> Result<(), ReplyError> {
        self.replies
            .lock()
            .map_err(|e| ReplyError::DeliveryFailed(e.to_string()))?
            .push(text.to_string());
        Ok(())
    }
}
