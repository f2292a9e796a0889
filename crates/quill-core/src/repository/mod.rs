//! Note repository: one contract over two persistence backends.
//!
//! The backend is picked once from [`RepositoryConfig`] and stays fixed for
//! the life of the repository.

mod local;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{PersistenceMode, RepositoryConfig};
use crate::error::Result;
use crate::models::{Note, NoteId};

pub use local::{LocalBackend, NOTES_STORAGE_KEY};
pub use remote::RemoteBackend;

/// Storage capability every persistence backend provides.
#[async_trait]
pub trait NoteBackend: Send + Sync {
    /// All stored notes, in storage order
    async fn list(&self) -> Result<Vec<Note>>;

    /// Create the note if no record shares its id, otherwise replace it.
    /// Returns the canonical persisted form.
    async fn upsert(&self, note: Note) -> Result<Note>;

    /// Delete a note. Deleting a missing id is not an error.
    async fn remove(&self, id: &NoteId) -> Result<()>;

    /// Which kind of persistence this backend represents
    fn mode(&self) -> PersistenceMode;
}

/// The backend selected from configuration.
pub enum Backend {
    Local(LocalBackend),
    Remote(RemoteBackend),
}

impl Backend {
    /// Remote when an API base URL is configured, local otherwise.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        match config.api_base() {
            Some(base_url) => {
                tracing::info!("Using remote notes API at {base_url}");
                Ok(Self::Remote(RemoteBackend::new(base_url)?))
            }
            None => {
                tracing::info!(
                    "Using local note storage in {}",
                    config.data_dir().display()
                );
                Ok(Self::Local(LocalBackend::new(config.data_dir())))
            }
        }
    }
}

#[async_trait]
impl NoteBackend for Backend {
    async fn list(&self) -> Result<Vec<Note>> {
        match self {
            Self::Local(backend) => backend.list().await,
            Self::Remote(backend) => backend.list().await,
        }
    }

    async fn upsert(&self, note: Note) -> Result<Note> {
        match self {
            Self::Local(backend) => backend.upsert(note).await,
            Self::Remote(backend) => backend.upsert(note).await,
        }
    }

    async fn remove(&self, id: &NoteId) -> Result<()> {
        match self {
            Self::Local(backend) => backend.remove(id).await,
            Self::Remote(backend) => backend.remove(id).await,
        }
    }

    fn mode(&self) -> PersistenceMode {
        match self {
            Self::Local(backend) => backend.mode(),
            Self::Remote(backend) => backend.mode(),
        }
    }
}

/// Uniform list/upsert/remove access to notes.
///
/// Cheap to clone; clones share the same backend.
pub struct NoteRepository<B = Backend> {
    backend: Arc<B>,
}

impl NoteRepository<Backend> {
    /// Build the repository for the configured persistence mode.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        Ok(Self::new(Backend::from_config(config)?))
    }
}

impl<B: NoteBackend> NoteRepository<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn mode(&self) -> PersistenceMode {
        self.backend.mode()
    }

    /// List every note.
    pub async fn list(&self) -> Result<Vec<Note>> {
        let notes = self.backend.list().await?;
        tracing::debug!("Listed {} notes", notes.len());
        Ok(notes)
    }

    /// Create or fully replace a note, returning the persisted form.
    pub async fn upsert(&self, note: Note) -> Result<Note> {
        let id = note.id.clone();
        let saved = self.backend.upsert(note).await?;
        tracing::debug!("Upserted note {} (sent as {})", saved.id, id);
        Ok(saved)
    }

    /// Remove a note by id; missing ids are a no-op.
    pub async fn remove(&self, id: &NoteId) -> Result<()> {
        self.backend.remove(id).await?;
        tracing::debug!("Removed note {id}");
        Ok(())
    }
}

impl<B> Clone for NoteRepository<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}
