//! File-based persona store — persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `Persona`. The file is human-inspectable and
//! can be edited by hand between runs. Lines that cannot be loaded are kept
//! verbatim and written back after the personas on every flush.
//!
//! Default location: `~/.personasmith/personas.jsonl` (see `store.path` in the config).

use async_trait::async_trait;
use personasmith_core::error::StoreError;
use personasmith_core::persona::{Persona, PersonaStore, PersonaUpdate};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::in_memory::{apply_update, insert_persona};

/// A file-backed persona store using JSONL (one JSON object per line).
///
/// Personas are loaded into memory on creation and flushed to disk on every
/// mutation (update, insert).
pub struct FilePersonaStore {
    path: PathBuf,
    personas: Arc<RwLock<Vec<Persona>>>,
    /// Raw lines skipped at load time
    skipped: Vec<String>,
}

impl FilePersonaStore {
    /// Open a store at the given path.
    ///
    /// If the file does not exist, starts empty (file created on first write).
    pub fn new(path: PathBuf) -> Self {
        let (personas, skipped) = Self::load_from_disk(&path);
        debug!(
            path = %path.display(),
            count = personas.len(),
            skipped = skipped.len(),
            "File persona store loaded"
        );
        Self {
            path,
            personas: Arc::new(RwLock::new(personas)),
            skipped,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw lines that could not be loaded. They survive every flush.
    pub fn skipped_lines(&self) -> &[String] {
        &self.skipped
    }

    /// Load personas from a JSONL file.
    ///
    /// Corrupted or invalid lines are skipped and returned separately.
    fn load_from_disk(path: &Path) -> (Vec<Persona>, Vec<String>) {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return (Vec::new(), Vec::new()),
        };

        let mut personas: Vec<Persona> = Vec::new();
        let mut skipped = Vec::new();
        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            let persona = match serde_json::from_str::<Persona>(line) {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted persona entry");
                    skipped.push(line.to_string());
                    continue;
                }
            };
            if let Err(e) = insert_persona(&mut personas, persona) {
                warn!(error = %e, "Skipping invalid persona entry");
                skipped.push(line.to_string());
            }
        }
        (personas, skipped)
    }

    /// Flush all personas to disk as JSONL.
    fn flush(&self, personas: &[Persona]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create persona directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for persona in personas {
            let line = serde_json::to_string(persona).map_err(|e| {
                StoreError::Storage(format!("Failed to serialize persona: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }
        for line in &self.skipped {
            content.push_str(line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content).map_err(|e| {
            StoreError::Storage(format!("Failed to write persona file: {e}"))
        })
    }
}

#[async_trait]
impl PersonaStore for FilePersonaStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, persona_id: &str) -> Result<Option<Persona>, StoreError> {
        let personas = self.personas.read().await;
        Ok(personas.iter().find(|p| p.persona_id == persona_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Persona>, StoreError> {
        Ok(self.personas.read().await.clone())
    }

    async fn update(&self, persona_id: &str, update: PersonaUpdate) -> Result<Option<Persona>, StoreError> {
        let mut personas = self.personas.write().await;
        let mut next = personas.clone();
        let updated = apply_update(&mut next, persona_id, update)?;
        self.flush(&next)?;
        *personas = next;
        info!(persona_id, path = %self.path.display(), "Persona updated on disk");
        Ok(Some(updated))
    }

    async fn insert(&self, persona: Persona) -> Result<(), StoreError> {
        let mut personas = self.personas.write().await;
        let mut next = personas.clone();
        insert_persona(&mut next, persona)?;
        self.flush(&next)?;
        *personas = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn insert_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personas.jsonl");

        let store = FilePersonaStore::new(path.clone());
        store.insert(Persona::new("Bert", "You are Bert.")).await.unwrap();

        let reopened = FilePersonaStore::new(path);
        let persona = reopened.get("Bert").await.unwrap().unwrap();
        assert_eq!(persona.system_prompt, "You are Bert.");
    }

    #[tokio::test]
    async fn update_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("personas.jsonl");

        let store = FilePersonaStore::new(path.clone());
        store.insert(Persona::new("Bert", "You are Bert.")).await.unwrap();
        store
            .update("Bert", PersonaUpdate {
                system_prompt: Some("You are a formal Bert.".into()),
                ..PersonaUpdate::default()
            })
            .await
            .unwrap();

        let reopened = FilePersonaStore::new(path);
        let persona = reopened.get("Bert").await.unwrap().unwrap();
        assert_eq!(persona.system_prompt, "You are a formal Bert.");
        assert!(persona.tools.is_none());
    }

    #[tokio::test]
    async fn corrupted_lines_are_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"persona_id":"Bert","system_prompt":"You are Bert."}}"#).unwrap();
        writeln!(file, "not json at all").unwrap();
        writeln!(file, r#"{{"persona_id":"Odd","begin_dialogs":["one"]}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"persona_id":"Ernie","tools":[]}}"#).unwrap();

        let store = FilePersonaStore::new(file.path().to_path_buf());
        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].tools, Some(vec![]));
        assert_eq!(store.skipped_lines().len(), 2);
    }

    #[tokio::test]
    async fn skipped_lines_survive_a_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personas.jsonl");
        let ernie = r#"{"persona_id":"Ernie","tools":["a",1]}"#;
        std::fs::write(&path, format!("{{\"persona_id\":\"Bert\"}}\n{ernie}\n")).unwrap();

        let store = FilePersonaStore::new(path.clone());
        assert!(store.get("Ernie").await.unwrap().is_none());
        store
            .update("Bert", PersonaUpdate {
                system_prompt: Some("x".into()),
                ..PersonaUpdate::default()
            })
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.lines().any(|line| line == ernie), "{content}");
        let reopened = FilePersonaStore::new(path);
        assert_eq!(reopened.get("Bert").await.unwrap().unwrap().system_prompt, "x");
        assert_eq!(reopened.skipped_lines(), [ernie.to_string()]);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personas.jsonl");
        let store = FilePersonaStore::new(path.clone());
        store.insert(Persona::new("Bert", "old")).await.unwrap();

        // A directory in place of the file makes every write fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let result = store
            .update("Bert", PersonaUpdate {
                system_prompt: Some("new".into()),
                ..PersonaUpdate::default()
            })
            .await;
        assert!(matches!(result, Err(StoreError::Storage(_))));
        assert_eq!(store.get("Bert").await.unwrap().unwrap().system_prompt, "old");

        assert!(store.insert(Persona::new("Ernie", "hi")).await.is_err());
        assert!(store.get("Ernie").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePersonaStore::new(dir.path().join("absent.jsonl"));
        assert!(store.get_all().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn update_missing_persona_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personas.jsonl");
        let store = FilePersonaStore::new(path.clone());

        let err = store.update("Ghost", PersonaUpdate::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!path.exists());
    }
}
