//! Persona records and the store trait.
//!
//! A persona is owned by a store; the rest of the system only reads it and
//! applies partial updates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::StoreError;

/// A named configuration bundle for an AI character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Unique key in the store
    pub persona_id: String,

    #[serde(default)]
    pub system_prompt: String,

    /// Opening dialog turns, alternating user/assistant
    #[serde(default)]
    pub begin_dialogs: Vec<String>,

    /// Tool allowlist. `None` enables every tool; an empty list enables none.
    #[serde(default)]
    pub tools: Option<Vec<String>>,
}

impl Persona {
    pub fn new(persona_id: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            persona_id: persona_id.into(),
            system_prompt: system_prompt.into(),
            begin_dialogs: Vec::new(),
            tools: None,
        }
    }

    /// Apply a partial update in place. Omitted fields stay as they are.
    pub fn apply(&mut self, update: PersonaUpdate) {
        if let Some(system_prompt) = update.system_prompt {
            self.system_prompt = system_prompt;
        }
        if let Some(begin_dialogs) = update.begin_dialogs {
            self.begin_dialogs = begin_dialogs;
        }
        if let Some(tools) = update.tools {
            self.tools = tools;
        }
    }

    /// Check the store-level invariants.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.persona_id.trim().is_empty() {
            return Err(StoreError::Invalid("persona_id must not be empty".into()));
        }
        validate_begin_dialogs(&self.begin_dialogs)
    }
}

/// Opening dialogs must pair up into user/assistant turns.
pub fn validate_begin_dialogs(begin_dialogs: &[String]) -> Result<(), StoreError> {
    if begin_dialogs.len() % 2 != 0 {
        return Err(StoreError::Invalid(format!(
            "begin_dialogs must have an even number of entries, got {}",
            begin_dialogs.len()
        )));
    }
    Ok(())
}

/// A partial persona update.
///
/// `None` on any field means "leave unchanged". For `tools`, `Some(None)`
/// resets the allowlist to "all tools".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonaUpdate {
    pub system_prompt: Option<String>,
    pub begin_dialogs: Option<Vec<String>>,
    pub tools: Option<Option<Vec<String>>>,
}

impl PersonaUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.system_prompt.is_none() && self.begin_dialogs.is_none() && self.tools.is_none()
    }
}

/// Persistence for persona records.
#[async_trait]
pub trait PersonaStore: Send + Sync {
    /// A human-readable name for this store (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Fetch one persona.
    async fn get(&self, persona_id: &str) -> Result<Option<Persona>, StoreError>;

    /// Fetch all personas, in insertion order.
    async fn get_all(&self) -> Result<Vec<Persona>, StoreError>;

    /// Apply a partial update. Fails with `NotFound` if the persona is absent.
    ///
    /// Returns the updated persona when the store can provide it cheaply.
    async fn update(&self, persona_id: &str, update: PersonaUpdate) -> Result<Option<Persona>, StoreError>;

    /// Add a new persona. Fails with `AlreadyExists` on duplicate IDs.
    async fn insert(&self, persona: Persona) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_leaves_omitted_fields() {
        let mut persona = Persona::new("Bert", "You are Bert.");
        persona.begin_dialogs = vec!["hi".into(), "hello".into()];

        persona.apply(PersonaUpdate {
            system_prompt: Some("You are a formal Bert.".into()),
            ..PersonaUpdate::default()
        });

        assert_eq!(persona.system_prompt, "You are a formal Bert.");
        assert_eq!(persona.begin_dialogs.len(), 2);
        assert!(persona.tools.is_none());
    }

    #[test]
    fn apply_distinguishes_empty_from_omitted() {
        let mut persona = Persona::new("Bert", "You are Bert.");
        persona.begin_dialogs = vec!["hi".into(), "hello".into()];

        persona.apply(PersonaUpdate {
            begin_dialogs: Some(vec![]),
            tools: Some(Some(vec![])),
            ..PersonaUpdate::default()
        });

        assert!(persona.begin_dialogs.is_empty());
        assert_eq!(persona.tools, Some(vec![]));
        assert_eq!(persona.system_prompt, "You are Bert.");
    }

    #[test]
    fn tools_can_be_reset_to_all() {
        let mut persona = Persona::new("Bert", "");
        persona.tools = Some(vec!["web_search".into()]);
        persona.apply(PersonaUpdate {
            tools: Some(None),
            ..PersonaUpdate::default()
        });
        assert!(persona.tools.is_none());
    }

    #[test]
    fn odd_dialogs_fail_validation() {
        let mut persona = Persona::new("Bert", "");
        persona.begin_dialogs = vec!["only user turn".into()];
        assert!(matches!(persona.validate(), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let persona: Persona = serde_json::from_str(r#"{"persona_id":"Bert"}"#).unwrap();
        assert_eq!(persona.system_prompt, "");
        assert!(persona.begin_dialogs.is_empty());
        assert!(persona.tools.is_none());
    }

    #[test]
    fn empty_update_detected() {
        assert!(PersonaUpdate::default().is_empty());
        assert!(!PersonaUpdate {
            tools: Some(None),
            ..PersonaUpdate::default()
        }
        .is_empty());
    }
}
