//! Note model

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title assigned when a note is created without one
pub const DEFAULT_TITLE: &str = "Untitled";

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([a-zA-Z][a-zA-Z0-9_-]*)").expect("Invalid regex"));

/// A unique, stable identifier for a note.
///
/// Ids are generated client-side as UUID v7 strings, but any string a server
/// hands back is accepted. An empty id means the note has not been assigned
/// one yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no id has been assigned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// Surrounding whitespace is dropped, however the id is built.
impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        if value.trim().len() == value.len() {
            Self(value)
        } else {
            Self::from(value.as_str())
        }
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    #[serde(default, skip_serializing_if = "NoteId::is_empty")]
    pub id: NoteId,
    /// Short title shown in lists
    #[serde(default)]
    pub title: String,
    /// Plain text content
    #[serde(default)]
    pub content: String,
    /// Creation timestamp (Unix ms)
    #[serde(default)]
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    #[serde(default)]
    pub updated_at: i64,
    /// Favorite flag
    #[serde(default)]
    pub favorite: bool,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Note {
    /// Create a new note with a fresh id and current timestamps.
    ///
    /// A blank title becomes [`DEFAULT_TITLE`].
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now_millis();
        let title = title.into();
        let title = if title.trim().is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title
        };

        Self {
            id: NoteId::new(),
            title,
            content: content.into(),
            created_at: now,
            updated_at: now,
            favorite: false,
            tags: Vec::new(),
        }
    }

    /// Advance `updated_at` to now, never moving it backwards.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at);
    }

    /// Timestamp used for display ordering: `updated_at`, falling back to
    /// `created_at` when the update time is missing.
    #[must_use]
    pub const fn sort_timestamp(&self) -> i64 {
        if self.updated_at > 0 {
            self.updated_at
        } else {
            self.created_at
        }
    }

    /// Whether the user-editable fields differ.
    ///
    /// Only title, content, and the favorite flag count; timestamp-only
    /// differences are not changes.
    #[must_use]
    pub fn has_changes(&self, other: &Self) -> bool {
        self.title != other.title || self.content != other.content || self.favorite != other.favorite
    }

    /// Title for display, substituting [`DEFAULT_TITLE`] when blank
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }
}

/// Current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Extract #tags from text
///
/// Valid tags match the pattern: `#[a-zA-Z][a-zA-Z0-9_-]*`
/// Tags are returned in lowercase, deduplicated and sorted.
///
/// # Examples
///
/// ```
/// use quill_core::models::extract_tags;
///
/// let tags = extract_tags("Hello #world this is #Rust-lang");
/// assert_eq!(tags, vec!["rust-lang".to_string(), "world".to_string()]);
/// ```
#[must_use]
pub fn extract_tags(text: &str) -> Vec<String> {
    TAG_PATTERN
        .captures_iter(text)
        .map(|cap| cap[1].to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn note_id_conversions_agree_on_whitespace() {
        let parsed: NoteId = " abc \n".parse().unwrap();
        assert_eq!(NoteId::from("  abc "), parsed);
        assert_eq!(NoteId::from(" abc".to_string()), parsed);
        assert_eq!(NoteId::from("abc".to_string()).as_str(), "abc");
        assert!(NoteId::from("   ").is_empty());
    }

    #[test]
    fn test_note_id_unique() {
        let id1 = NoteId::new();
        let id2 = NoteId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_note_id_parse_trims() {
        let parsed: NoteId = "  abc-123 ".parse().unwrap();
        assert_eq!(parsed.as_str(), "abc-123");
        assert!(NoteId::default().is_empty());
    }

    #[test]
    fn test_note_new_defaults() {
        let note = Note::new("", "milk eggs");
        assert_eq!(note.title, "Untitled");
        assert_eq!(note.content, "milk eggs");
        assert!(!note.favorite);
        assert!(note.tags.is_empty());
        assert!(!note.id.is_empty());
        assert!(note.created_at > 0);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_note_new_keeps_title() {
        let note = Note::new("Shopping", "");
        assert_eq!(note.title, "Shopping");
    }

    #[test]
    fn test_touch_never_moves_backwards() {
        let mut note = Note::new("Future", "");
        note.updated_at = i64::MAX - 1;
        note.touch();
        assert_eq!(note.updated_at, i64::MAX - 1);

        note.updated_at = 0;
        note.touch();
        assert!(note.updated_at > 0);
    }

    #[test]
    fn test_has_changes_ignores_timestamps_and_tags() {
        let original = Note::new("Title", "Body");
        let mut other = original.clone();
        other.updated_at += 5_000;
        other.tags.push("later".to_string());
        assert!(!original.has_changes(&other));

        other.favorite = true;
        assert!(original.has_changes(&other));
    }

    #[test]
    fn test_sort_timestamp_falls_back_to_created_at() {
        let mut note = Note::new("A", "");
        note.created_at = 10;
        note.updated_at = 0;
        assert_eq!(note.sort_timestamp(), 10);
        note.updated_at = 20;
        assert_eq!(note.sort_timestamp(), 20);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut note = Note::new("T", "C");
        note.id = NoteId::from("n1");
        note.created_at = 1;
        note.updated_at = 2;
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], "n1");
        assert_eq!(json["createdAt"], 1);
        assert_eq!(json["updatedAt"], 2);
        assert_eq!(json["favorite"], false);
    }

    #[test]
    fn test_deserializes_with_missing_optional_fields() {
        let note: Note =
            serde_json::from_str(r#"{"id":"x","title":"T","content":"C","createdAt":5}"#).unwrap();
        assert_eq!(note.updated_at, 0);
        assert!(!note.favorite);
        assert!(note.tags.is_empty());
    }

    #[test]
    fn test_empty_id_is_not_serialized() {
        let mut note = Note::new("T", "C");
        note.id = NoteId::default();
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_extract_tags_multiple() {
        let tags = extract_tags("#hello #world #rust");
        assert_eq!(tags, vec!["hello", "rust", "world"]);
    }

    #[test]
    fn test_extract_tags_lowercase_and_dedup() {
        let tags = extract_tags("#hello #Hello #HELLO #my-tag #another_tag");
        assert_eq!(tags, vec!["another_tag", "hello", "my-tag"]);
    }

    #[test]
    fn test_extract_tags_invalid() {
        // Tags starting with numbers are invalid
        let tags = extract_tags("#123 #456test");
        assert!(tags.is_empty());
    }
}
