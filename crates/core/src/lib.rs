//! # personasmith Core
//!
//! Domain types, traits, and error definitions for personasmith.
//! This crate has no framework dependencies; it defines the domain model
//! that all other crates implement against.
//!
//! The collaborators of the persona agent are traits here:
//! - [`PersonaStore`]: where persona records live
//! - [`Provider`] / [`ProviderDirectory`]: LLM backends and how to find them
//! - [`Tool`]: capabilities exposed to the LLM
//! - [`ReplySink`]: where command output goes

pub mod error;
pub mod format;
pub mod message;
pub mod persona;
pub mod provider;
pub mod reply;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ReplyError, StoreError, ToolError};
pub use message::{Message, MessageToolCall, Role, Transcript};
pub use persona::{Persona, PersonaStore, PersonaUpdate};
pub use provider::{Provider, ProviderDirectory, ProviderRequest, ProviderResponse, ResponseToolCall};
pub use reply::{BufferedReplies, ReplySink};
pub use tool::{Tool, ToolCall, ToolResult, ToolSet};
