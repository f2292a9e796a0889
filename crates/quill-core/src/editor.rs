//! Editor session with debounced autosave.
//!
//! The session holds a draft of the active note and the last snapshot known
//! to be persisted. Edits restart a single debounce timer; when it expires
//! and the draft still differs from the snapshot, the draft is upserted.
//! Saves run one at a time: a timer that fires while a save is in flight
//! backs off, and the finishing save schedules another round if the draft
//! moved on in the meantime. Results are reported on a channel so the owner
//! can refresh its note collection and notify the user.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::models::{Note, NoteId};
use crate::repository::{Backend, NoteBackend, NoteRepository};

/// Quiet period after the last edit before an autosave is attempted
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(600);

/// Where the session is in the autosave cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorStatus {
    /// Draft matches the last saved snapshot (or the last save failed)
    #[default]
    Idle,
    /// Draft has edits waiting for the debounce window
    Dirty,
    /// An upsert is in flight
    Saving,
}

/// Result of a save attempt, reported on the session channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(Note),
    Failed { id: NoteId, message: String },
}

#[derive(Debug, Default)]
struct EditorState {
    draft: Option<Note>,
    last_saved: Option<Note>,
    status: EditorStatus,
    /// Bumped whenever a different note is opened
    generation: u64,
    /// Bumped on every draft change
    revision: u64,
    /// Set once the session is dropped; no further autosaves are scheduled
    closed: bool,
}

struct Shared<B> {
    repo: NoteRepository<B>,
    state: Mutex<EditorState>,
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Held for the duration of an upsert
    save_lock: tokio::sync::Mutex<()>,
    outcomes: mpsc::UnboundedSender<SaveOutcome>,
}

impl<B> Shared<B> {
    fn state(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel_timer(&self) {
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = timer {
            timer.abort();
        }
    }
}

impl<B: NoteBackend + 'static> Shared<B> {
    /// Restart the debounce window.
    fn schedule_autosave(self: Arc<Self>) {
        if self.state().closed {
            return;
        }

        let shared = Arc::clone(&self);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(AUTOSAVE_DEBOUNCE).await;
            // Detached so cancelling the timer never aborts an in-flight save.
            tokio::spawn(async move {
                let _ = shared.flush(false).await;
            });
        });

        let previous = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Upsert the draft. Unless `force` is set, nothing happens when the
    /// draft has no changes against the snapshot, or when another save is
    /// still in flight. A forced save waits for the one in flight.
    async fn flush(self: Arc<Self>, force: bool) -> Result<Option<Note>> {
        let _guard = if force {
            self.save_lock.lock().await
        } else if let Ok(guard) = self.save_lock.try_lock() {
            guard
        } else {
            tracing::debug!("Save in flight, autosave deferred");
            return Ok(None);
        };

        let (note, generation, revision) = {
            let mut state = self.state();
            let Some(draft) = state.draft.clone() else {
                return Ok(None);
            };
            let changed = state
                .last_saved
                .as_ref()
                .map_or(true, |saved| draft.has_changes(saved));

            if !changed && !force {
                if state.status == EditorStatus::Dirty {
                    state.status = EditorStatus::Idle;
                }
                return Ok(None);
            }

            state.status = EditorStatus::Saving;
            (draft, state.generation, state.revision)
        };

        let id = note.id.clone();
        let result = self.repo.upsert(note).await;

        let resave = {
            let mut state = self.state();
            if state.generation == generation {
                if let Ok(saved) = &result {
                    state.last_saved = Some(saved.clone());
                }
                state.status = if state.revision != revision {
                    settled_status(&state)
                } else {
                    if let Ok(saved) = &result {
                        state.draft = Some(saved.clone());
                    }
                    EditorStatus::Idle
                };
            } else {
                tracing::debug!("Save of {id} finished after switching notes");
            }
            state.generation == generation && state.status == EditorStatus::Dirty
        };
        if resave {
            Arc::clone(&self).schedule_autosave();
        }

        match result {
            Ok(saved) => {
                tracing::debug!("Saved note {}", saved.id);
                let _ = self.outcomes.send(SaveOutcome::Saved(saved.clone()));
                Ok(Some(saved))
            }
            Err(error) => {
                tracing::error!("Failed to save note {id}: {error}");
                let _ = self.outcomes.send(SaveOutcome::Failed {
                    id,
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }
}

fn settled_status(state: &EditorState) -> EditorStatus {
    match (&state.draft, &state.last_saved) {
        (Some(draft), Some(saved)) if draft.has_changes(saved) => EditorStatus::Dirty,
        _ => EditorStatus::Idle,
    }
}

/// Draft state and autosave timer for the active note.
pub struct EditorSession<B = Backend> {
    shared: Arc<Shared<B>>,
}

impl<B: NoteBackend + 'static> EditorSession<B> {
    /// New session with no note open, plus the receiver for save outcomes.
    pub fn new(repo: NoteRepository<B>) -> (Self, mpsc::UnboundedReceiver<SaveOutcome>) {
        let (outcomes, receiver) = mpsc::unbounded_channel();
        let session = Self {
            shared: Arc::new(Shared {
                repo,
                state: Mutex::new(EditorState::default()),
                timer: Mutex::new(None),
                save_lock: tokio::sync::Mutex::new(()),
                outcomes,
            }),
        };
        (session, receiver)
    }

    /// Switch to another note (or none). Draft and snapshot both reset to
    /// `note`; pending edits to the previous note are dropped.
    pub fn open(&mut self, note: Option<Note>) {
        self.shared.cancel_timer();
        let mut state = self.shared.state();
        state.generation += 1;
        state.revision = 0;
        state.draft.clone_from(&note);
        state.last_saved = note;
        state.status = EditorStatus::Idle;
    }

    pub fn draft(&self) -> Option<Note> {
        self.shared.state().draft.clone()
    }

    pub fn last_saved(&self) -> Option<Note> {
        self.shared.state().last_saved.clone()
    }

    pub fn status(&self) -> EditorStatus {
        self.shared.state().status
    }

    pub fn active_id(&self) -> Option<NoteId> {
        self.shared.state().draft.as_ref().map(|note| note.id.clone())
    }

    /// Whether the draft differs from the last saved snapshot
    pub fn has_unsaved_changes(&self) -> bool {
        let state = self.shared.state();
        match (&state.draft, &state.last_saved) {
            (Some(draft), Some(saved)) => draft.has_changes(saved),
            _ => false,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        let title = title.into();
        self.edit(|draft| draft.title = title)
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        self.edit(|draft| draft.content = content)
    }

    pub fn set_favorite(&mut self, favorite: bool) -> bool {
        self.edit(|draft| draft.favorite = favorite)
    }

    /// Apply an edit to the draft and restart the debounce window.
    /// Returns `false` when no note is open.
    pub fn edit(&mut self, apply: impl FnOnce(&mut Note)) -> bool {
        {
            let mut state = self.shared.state();
            let Some(draft) = state.draft.as_mut() else {
                return false;
            };
            apply(draft);
            draft.touch();
            state.revision += 1;
            if state.status != EditorStatus::Saving {
                state.status = EditorStatus::Dirty;
            }
        }

        Arc::clone(&self.shared).schedule_autosave();
        true
    }

    /// Save immediately, skipping the debounce window.
    ///
    /// Cancels any pending autosave and always issues the upsert, even if
    /// nothing changed. A save already in flight finishes first. Returns
    /// `Ok(None)` when no note is open.
    pub async fn save_now(&mut self) -> Result<Option<Note>> {
        self.shared.cancel_timer();
        Arc::clone(&self.shared).flush(true).await
    }

    /// Discard unsaved edits, reverting the draft to the last saved
    /// snapshot. A save still in flight reconciles when it lands.
    pub fn undo(&mut self) {
        self.shared.cancel_timer();
        let mut state = self.shared.state();
        state.draft = state.last_saved.clone();
        state.revision += 1;
        if state.status != EditorStatus::Saving {
            state.status = EditorStatus::Idle;
        }
    }

    /// Adopt a version of the active note that was saved outside the
    /// editor. In-progress title and content edits are kept.
    pub fn apply_saved(&mut self, saved: &Note) {
        let mut state = self.shared.state();
        let Some(draft) = state.draft.as_mut() else {
            return;
        };
        if draft.id != saved.id {
            return;
        }

        draft.favorite = saved.favorite;
        draft.created_at = saved.created_at;
        draft.updated_at = draft.updated_at.max(saved.updated_at);
        state.last_saved = Some(saved.clone());
        if state.status != EditorStatus::Saving {
            state.status = settled_status(&state);
        }
    }
}

impl<B> Drop for EditorSession<B> {
    fn drop(&mut self) {
        self.shared.state().closed = true;
        self.shared.cancel_timer();
    }
}
