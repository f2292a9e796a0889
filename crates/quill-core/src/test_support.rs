//! In-memory backend that records calls, for session and editor tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::config::PersistenceMode;
use crate::error::{Error, Result};
use crate::models::{Note, NoteId};
use crate::repository::NoteBackend;

#[derive(Default)]
struct Inner {
    notes: Mutex<Vec<Note>>,
    upserts: Mutex<Vec<(Instant, Note)>>,
    removes: Mutex<Vec<NoteId>>,
    failing: AtomicBool,
    delay: Mutex<Duration>,
}

/// Clones share state, so a test can keep one handle and give the other to
/// a repository.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    inner: Arc<Inner>,
}

impl RecordingBackend {
    pub fn with_notes(notes: Vec<Note>) -> Self {
        let backend = Self::default();
        *backend.inner.notes.lock().unwrap() = notes;
        backend
    }

    pub fn upserts(&self) -> Vec<(Instant, Note)> {
        self.inner.upserts.lock().unwrap().clone()
    }

    pub fn upsert_count(&self) -> usize {
        self.inner.upserts.lock().unwrap().len()
    }

    pub fn removes(&self) -> Vec<NoteId> {
        self.inner.removes.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Vec<Note> {
        self.inner.notes.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.inner.delay.lock().unwrap() = delay;
    }

    fn check_failing(&self) -> Result<()> {
        if self.inner.failing.load(Ordering::SeqCst) {
            Err(Error::Api("backend unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NoteBackend for RecordingBackend {
    async fn list(&self) -> Result<Vec<Note>> {
        self.check_failing()?;
        Ok(self.stored())
    }

    async fn upsert(&self, note: Note) -> Result<Note> {
        self.inner
            .upserts
            .lock()
            .unwrap()
            .push((Instant::now(), note.clone()));

        let delay = *self.inner.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.check_failing()?;

        let mut notes = self.inner.notes.lock().unwrap();
        match notes.iter_mut().find(|existing| existing.id == note.id) {
            Some(existing) => existing.clone_from(&note),
            None => notes.insert(0, note.clone()),
        }
        Ok(note)
    }

    async fn remove(&self, id: &NoteId) -> Result<()> {
        self.inner.removes.lock().unwrap().push(id.clone());
        self.check_failing()?;
        self.inner.notes.lock().unwrap().retain(|note| &note.id != id);
        Ok(())
    }

    fn mode(&self) -> PersistenceMode {
        PersistenceMode::Local
    }
}
