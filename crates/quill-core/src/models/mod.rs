//! Data models for Quill

mod note;

pub use note::{extract_tags, now_millis, Note, NoteId, DEFAULT_TITLE};
