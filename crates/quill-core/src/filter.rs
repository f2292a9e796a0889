//! Note list filtering and display ordering.
//!
//! Everything here is a pure derivation over a note slice; callers recompute
//! it whenever the collection or a filter input changes.

use std::cmp::Reverse;

use crate::models::Note;

/// Inputs of the list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Free-text query, matched case-insensitively against title and content
    pub query: String,
    /// Keep only favorited notes
    pub favorites_only: bool,
    /// Keep only notes carrying this tag (case-insensitive)
    pub tag: Option<String>,
}

impl NoteFilter {
    #[must_use]
    pub fn new(query: impl Into<String>, favorites_only: bool) -> Self {
        Self {
            query: query.into(),
            favorites_only,
            tag: None,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    /// Whether `note` passes every active condition.
    #[must_use]
    pub fn matches(&self, note: &Note) -> bool {
        let query = normalize_query(&self.query);
        let tag = self
            .tag
            .as_deref()
            .map(normalize_query)
            .filter(|tag| !tag.is_empty());

        self.matches_normalized(note, &query, tag.as_deref())
    }

    /// Notes passing the filter, in input order.
    #[must_use]
    pub fn apply<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        let query = normalize_query(&self.query);
        let tag = self
            .tag
            .as_deref()
            .map(normalize_query)
            .filter(|tag| !tag.is_empty());

        notes
            .iter()
            .filter(|note| self.matches_normalized(note, &query, tag.as_deref()))
            .collect()
    }

    fn matches_normalized(&self, note: &Note, query: &str, tag: Option<&str>) -> bool {
        (!self.favorites_only || note.favorite)
            && note_matches_query(note, query)
            && note_matches_tag(note, tag)
    }
}

/// Notes where `(!favorites_only || favorite) && (query empty || query in
/// title or content)`, compared case-insensitively, in input order.
#[must_use]
pub fn filter_notes<'a>(notes: &'a [Note], query: &str, favorites_only: bool) -> Vec<&'a Note> {
    NoteFilter::new(query, favorites_only).apply(notes)
}

/// Sort newest first by `updated_at`, falling back to `created_at`.
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by_key(|note| Reverse(note.sort_timestamp()));
}

fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn note_matches_query(note: &Note, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    note.title.to_lowercase().contains(query) || note.content.to_lowercase().contains(query)
}

fn note_matches_tag(note: &Note, tag: Option<&str>) -> bool {
    let Some(tag) = tag else {
        return true;
    };
    note.tags.iter().any(|candidate| candidate.to_lowercase() == tag)
}
