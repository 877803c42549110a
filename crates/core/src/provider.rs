//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider takes the current prompt, a system prompt, the tools the model
//! may call, and the transcript so far, and returns one turn's response.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;

/// One completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The prompt for this turn. Never empty; the loop uses `" "` as a placeholder.
    pub prompt: String,

    /// Fixed system instructions
    pub system_prompt: String,

    /// Optional model override; `None` means the provider's default model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Transcript accumulated before this turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Message>,
}

/// A tool definition sent to the LLM so it knows what tools it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseToolCall {
    pub name: String,

    /// Decoded arguments
    pub arguments: serde_json::Value,

    /// Call ID, when the backend supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// The model's reply for one turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Tool calls requested this turn, in the order returned
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ResponseToolCall>,

    /// Rendered content chunks (first chunk is the primary text)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub result_chain: Vec<String>,

    /// Raw completion text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_text: Option<String>,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    /// Which model actually responded
    #[serde(default)]
    pub model: String,
}

impl ProviderResponse {
    /// A text-only response.
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            result_chain: vec![content.clone()],
            completion_text: Some(content),
            ..Self::default()
        }
    }

    /// A response requesting tool calls, with an optional leading text chunk.
    pub fn tool_calls(calls: Vec<ResponseToolCall>, leading_text: Option<&str>) -> Self {
        Self {
            tool_calls: calls,
            result_chain: leading_text.map(|t| vec![t.to_string()]).unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The first rendered chunk, if any.
    pub fn leading_text(&self) -> Option<&str> {
        self.result_chain.first().map(String::as_str)
    }
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Every LLM backend implements this trait. The agent loop calls `complete()`
/// without knowing which backend is being used.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;
}

/// Where the command handler looks up providers.
///
/// `origin` identifies the conversation a command came from; directories may
/// use it to pick a per-conversation provider.
pub trait ProviderDirectory: Send + Sync {
    /// Look up a provider by its configured ID.
    fn by_id(&self, id: &str) -> Option<Arc<dyn Provider>>;

    /// The provider currently in use for the given conversation.
    fn active(&self, origin: &str) -> Option<Arc<dyn Provider>>;
}
