//! LLM Provider implementations for personasmith.
//!
//! All providers implement the `personasmith_core::Provider` trait.
//! The router implements `ProviderDirectory`, which is how the command
//! handler finds a provider by ID or by conversation origin.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
