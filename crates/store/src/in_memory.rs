//! In-memory persona store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use personasmith_core::error::StoreError;
use personasmith_core::persona::{Persona, PersonaStore, PersonaUpdate, validate_begin_dialogs};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps personas in a Vec, in insertion order.
pub struct InMemoryPersonaStore {
    personas: Arc<RwLock<Vec<Persona>>>,
}

impl InMemoryPersonaStore {
    pub fn new() -> Self {
        Self {
            personas: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a store pre-populated with the given personas.
    pub fn with_personas(personas: Vec<Persona>) -> Self {
        Self {
            personas: Arc::new(RwLock::new(personas)),
        }
    }
}

impl Default for InMemoryPersonaStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared update logic for the Vec-backed stores.
pub(crate) fn apply_update(
    personas: &mut [Persona],
    persona_id: &str,
    update: PersonaUpdate,
) -> Result<Persona, StoreError> {
    if let Some(dialogs) = &update.begin_dialogs {
        validate_begin_dialogs(dialogs)?;
    }
    let persona = personas
        .iter_mut()
        .find(|p| p.persona_id == persona_id)
        .ok_or_else(|| StoreError::NotFound(persona_id.to_string()))?;
    persona.apply(update);
    Ok(persona.clone())
}

/// Shared insert logic for the Vec-backed stores.
pub(crate) fn insert_persona(personas: &mut Vec<Persona>, persona: Persona) -> Result<(), StoreError> {
    persona.validate()?;
    if personas.iter().any(|p| p.persona_id == persona.persona_id) {
        return Err(StoreError::AlreadyExists(persona.persona_id));
    }
    personas.push(persona);
    Ok(())
}

#[async_trait]
impl PersonaStore for InMemoryPersonaStore {
    fn name(&self) -> &str { "in_memory" }

    async fn get(&self, persona_id: &str) -> Result<Option<Persona>, StoreError> {
        let personas = self.personas.read().await;
        Ok(personas.iter().find(|p| p.persona_id == persona_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Persona>, StoreError> {
        Ok(self.personas.read().await.clone())
    }

    async fn update(&self, persona_id: &str, update: PersonaUpdate) -> Result<Option<Persona>, StoreError> {
        let mut personas = self.personas.write().await;
        apply_update(&mut personas, persona_id, update).map(Some)
    }

    async fn insert(&self, persona: Persona) -> Result<(), StoreError> {
        let mut personas = self.personas.write().await;
        insert_persona(&mut personas, persona)
    }
}
