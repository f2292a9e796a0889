//! Local backend: the whole collection as one JSON array under one key.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::PersistenceMode;
use crate::error::Result;
use crate::models::{Note, NoteId};
use crate::repository::NoteBackend;
use crate::storage::LocalStore;

/// Storage key holding the serialized note array
pub const NOTES_STORAGE_KEY: &str = "notes.v1";

/// Notes persisted in the local key/value store.
///
/// Every write replaces the full document; last writer wins.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    store: LocalStore,
}

impl LocalBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            store: LocalStore::new(dir),
        }
    }

    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    fn read_all(&self) -> Result<Vec<Note>> {
        let Some(raw) = self.store.get_item(NOTES_STORAGE_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Note>>(&raw) {
            Ok(notes) => Ok(notes),
            Err(error) => {
                tracing::warn!(
                    "Ignoring unreadable note data under '{}': {}",
                    NOTES_STORAGE_KEY,
                    error
                );
                Ok(Vec::new())
            }
        }
    }

    fn write_all(&self, notes: &[Note]) -> Result<()> {
        let raw = serde_json::to_string(notes)?;
        self.store.set_item(NOTES_STORAGE_KEY, &raw)
    }
}

#[async_trait]
impl NoteBackend for LocalBackend {
    async fn list(&self) -> Result<Vec<Note>> {
        self.read_all()
    }

    async fn upsert(&self, note: Note) -> Result<Note> {
        let mut notes = self.read_all()?;
        match notes.iter_mut().find(|existing| existing.id == note.id) {
            Some(existing) => existing.clone_from(&note),
            None => notes.insert(0, note.clone()),
        }
        self.write_all(&notes)?;
        Ok(note)
    }

    async fn remove(&self, id: &NoteId) -> Result<()> {
        let mut notes = self.read_all()?;
        notes.retain(|note| &note.id != id);
        self.write_all(&notes)
    }

    fn mode(&self) -> PersistenceMode {
        PersistenceMode::Local
    }
}
