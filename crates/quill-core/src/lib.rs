//! quill-core - Core library for Quill
//!
//! Note model, persistence backends (local file store or remote REST API),
//! the autosaving editor session, list filtering and the session state used
//! by the Quill front ends.

pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod filter;
pub mod models;
pub mod notify;
pub mod repository;
pub mod storage;
pub mod util;

#[cfg(test)]
mod test_support;

pub use app::{Key, KeyInput, NotesApp, Section};
pub use config::{PersistenceMode, RepositoryConfig};
pub use editor::{EditorSession, EditorStatus, SaveOutcome};
pub use error::{Error, Result};
pub use models::{Note, NoteId};
pub use repository::{Backend, NoteBackend, NoteRepository};
