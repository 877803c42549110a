//! Persona tools for personasmith.
//!
//! Two tools let the LLM read and rewrite a persona:
//! - `get_persona_detail`: fetch the current record
//! - `update_persona_details`: partially overwrite it
//!
//! Both always answer with a JSON payload (`{"ok": true, "persona": {...}}`
//! or `{"ok": false, "error": "..."}`) so failures reach the LLM as text
//! it can react to.

pub mod get_persona_detail;
pub mod payload;
pub mod update_persona_details;

use std::sync::Arc;

use personasmith_core::persona::PersonaStore;
use personasmith_core::tool::ToolSet;

pub use get_persona_detail::GetPersonaDetailTool;
pub use update_persona_details::UpdatePersonaDetailsTool;

/// The tool set for one persona-update run.
pub fn persona_toolset(store: Arc<dyn PersonaStore>) -> ToolSet {
    ToolSet::new()
        .with(Box::new(GetPersonaDetailTool::new(store.clone())))
        .with(Box::new(UpdatePersonaDetailsTool::new(store)))
}
