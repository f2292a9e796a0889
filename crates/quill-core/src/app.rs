//! Session state shared by every front end.
//!
//! [`NotesApp`] owns the note collection, the list filters, the active
//! selection, the editor session and the notification list. Front ends
//! drive it through its methods and render from its accessors.

use tokio::sync::mpsc;

use crate::editor::{EditorSession, SaveOutcome};
use crate::error::{Error, Result};
use crate::filter::{sort_notes, NoteFilter};
use crate::models::{Note, NoteId, DEFAULT_TITLE};
use crate::notify::{Notifications, ERROR_TIMEOUT, INFO_TIMEOUT};
use crate::repository::{Backend, NoteBackend, NoteRepository};

/// Top-level list section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    All,
    Favorites,
}

impl Section {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All notes",
            Self::Favorites => "Favorites",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Delete,
    Char(char),
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
    /// Command on macOS, Super elsewhere
    pub meta: bool,
}

impl KeyInput {
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
        }
    }

    #[must_use]
    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub const fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    const fn has_command_modifier(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Notes session: collection, filters, selection, editor, notifications.
pub struct NotesApp<B = Backend> {
    repo: NoteRepository<B>,
    notes: Vec<Note>,
    active_id: Option<NoteId>,
    query: String,
    favorites_only: bool,
    section: Section,
    editor: EditorSession<B>,
    outcomes: mpsc::UnboundedReceiver<SaveOutcome>,
    notifications: Notifications,
}

impl<B: NoteBackend + 'static> NotesApp<B> {
    pub fn new(repo: NoteRepository<B>) -> Self {
        let (editor, outcomes) = EditorSession::new(repo.clone());
        Self {
            repo,
            notes: Vec::new(),
            active_id: None,
            query: String::new(),
            favorites_only: false,
            section: Section::default(),
            editor,
            outcomes,
            notifications: Notifications::new(),
        }
    }

    pub const fn repository(&self) -> &NoteRepository<B> {
        &self.repo
    }

    /// The whole collection, newest first
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub const fn active_id(&self) -> Option<&NoteId> {
        self.active_id.as_ref()
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active_id.as_ref().and_then(|id| self.note(id))
    }

    pub const fn editor(&self) -> &EditorSession<B> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorSession<B> {
        &mut self.editor
    }

    pub fn notifications(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub const fn favorites_only(&self) -> bool {
        self.favorites_only
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        self.favorites_only = favorites_only;
    }

    pub const fn section(&self) -> Section {
        self.section
    }

    pub fn set_section(&mut self, section: Section) {
        self.section = section;
    }

    /// Filter inputs currently in effect. The Favorites section implies
    /// favorites-only.
    pub fn filter(&self) -> NoteFilter {
        NoteFilter::new(
            self.query.clone(),
            self.favorites_only || self.section == Section::Favorites,
        )
    }

    /// Notes shown in the list, in display order.
    pub fn visible_notes(&self) -> Vec<&Note> {
        self.filter().apply(&self.notes)
    }

    /// Replace the collection with the stored notes.
    pub async fn load(&mut self) {
        match self.repo.list().await {
            Ok(mut notes) => {
                sort_notes(&mut notes);
                self.notes = notes;
                tracing::info!("Loaded {} notes", self.notes.len());

                let active_missing = self
                    .active_id
                    .as_ref()
                    .map_or(true, |id| self.note(id).is_none());
                if active_missing {
                    let first = self.notes.first().map(|note| note.id.clone());
                    self.set_active(first);
                }
            }
            Err(error) => {
                self.notifications
                    .error(format!("Failed to load notes: {error}"), ERROR_TIMEOUT);
            }
        }
    }

    /// Create an empty note, persist it and select it.
    pub async fn create_note(&mut self) -> Option<NoteId> {
        let note = Note::new(DEFAULT_TITLE, "");
        match self.repo.upsert(note).await {
            Ok(saved) => {
                let id = saved.id.clone();
                self.notes.retain(|existing| existing.id != id);
                self.notes.insert(0, saved);
                sort_notes(&mut self.notes);
                self.set_active(Some(id.clone()));
                self.notifications.info("Note created");
                Some(id)
            }
            Err(error) => {
                self.notifications
                    .error(format!("Create failed: {error}"), INFO_TIMEOUT);
                None
            }
        }
    }

    /// Persist `note` and fold the result into the collection.
    pub async fn save_note(&mut self, note: Note) -> Result<Note> {
        match self.repo.upsert(note).await {
            Ok(saved) => {
                self.store_saved(saved.clone());
                Ok(saved)
            }
            Err(error) => {
                self.notifications
                    .error(format!("Save failed: {error}"), ERROR_TIMEOUT);
                Err(error)
            }
        }
    }

    /// Remove a note. When it was the active note, the first remaining note
    /// becomes active.
    pub async fn delete_note(&mut self, id: &NoteId) -> Result<()> {
        if let Err(error) = self.repo.remove(id).await {
            self.notifications
                .error(format!("Delete failed: {error}"), INFO_TIMEOUT);
            return Err(error);
        }

        self.notes.retain(|note| &note.id != id);
        if self.active_id.as_ref() == Some(id) {
            let fallback = self.notes.first().map(|note| note.id.clone());
            self.set_active(fallback);
        }
        self.notifications.info("Note deleted");
        Ok(())
    }

    /// Flip the favorite flag of a note and save it.
    pub async fn toggle_favorite(&mut self, id: &NoteId) -> Result<Note> {
        let mut note = self
            .note(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        note.favorite = !note.favorite;
        note.touch();

        let saved = self.save_note(note).await?;
        if self.active_id.as_ref() == Some(&saved.id) {
            self.editor.apply_saved(&saved);
        }
        Ok(saved)
    }

    /// Open a note in the editor. Returns `false` for unknown ids.
    pub fn select(&mut self, id: &NoteId) -> bool {
        if self.note(id).is_none() {
            return false;
        }
        if self.active_id.as_ref() != Some(id) {
            self.set_active(Some(id.clone()));
        }
        true
    }

    /// Fold finished editor saves into the collection.
    pub fn process_save_outcomes(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            match outcome {
                SaveOutcome::Saved(note) => self.store_saved(note),
                SaveOutcome::Failed { message, .. } => {
                    self.notifications
                        .error(format!("Save failed: {message}"), ERROR_TIMEOUT);
                }
            }
        }
    }

    /// Apply a keyboard shortcut. Returns whether the key was handled.
    pub async fn handle_key(&mut self, input: KeyInput) -> bool {
        match input.key {
            Key::Up => self.move_selection(-1),
            Key::Down => self.move_selection(1),
            Key::Delete => {
                let Some(id) = self.active_id.clone() else {
                    return false;
                };
                let _ = self.delete_note(&id).await;
                true
            }
            Key::Char(c) if input.has_command_modifier() && c.eq_ignore_ascii_case(&'f') => {
                let Some(id) = self.active_id.clone() else {
                    return false;
                };
                let _ = self.toggle_favorite(&id).await;
                true
            }
            Key::Char(_) => false,
        }
    }

    fn move_selection(&mut self, step: isize) -> bool {
        let visible: Vec<NoteId> = self
            .visible_notes()
            .into_iter()
            .map(|note| note.id.clone())
            .collect();
        if visible.is_empty() {
            return false;
        }

        let current = self
            .active_id
            .as_ref()
            .and_then(|id| visible.iter().position(|candidate| candidate == id));
        let next = match current {
            None if step > 0 => 0,
            None => return false,
            Some(index) => index
                .saturating_add_signed(step)
                .min(visible.len() - 1),
        };

        if current == Some(next) {
            return true;
        }
        self.set_active(Some(visible[next].clone()));
        true
    }

    fn set_active(&mut self, id: Option<NoteId>) {
        let note = id.as_ref().and_then(|id| self.note(id)).cloned();
        self.active_id = id;
        self.editor.open(note);
    }

    fn store_saved(&mut self, saved: Note) {
        match self.notes.iter_mut().find(|note| note.id == saved.id) {
            Some(existing) => *existing = saved,
            None => self.notes.insert(0, saved),
        }
        sort_notes(&mut self.notes);
    }
}
