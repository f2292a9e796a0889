use quill_core::config::RepositoryConfig;
use quill_core::models::extract_tags;
use quill_core::Note;

use crate::commands::common::{
    edit_in_editor, load_notes, normalize_note_identifier, open_repository, resolve_note,
};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    title: Option<String>,
    content: Option<String>,
    config: &RepositoryConfig,
) -> Result<(), CliError> {
    let normalized_id = normalize_note_identifier(id)?;
    let repo = open_repository(config)?;
    let notes = load_notes(&repo).await?;
    let note = resolve_note(&notes, &normalized_id)?;

    let content = if title.is_none() && content.is_none() {
        let Some(edited_content) = edit_in_editor(&note.content)? else {
            return Err(CliError::EmptyEditedContent);
        };
        Some(edited_content)
    } else {
        content
    };

    let Some(updated) = apply_edit(&note, title, content) else {
        println!("{}", note.id);
        return Ok(());
    };

    let saved = repo.upsert(updated).await?;
    println!("{}", saved.id);
    Ok(())
}

/// The edited note, or `None` when nothing changed.
pub fn apply_edit(note: &Note, title: Option<String>, content: Option<String>) -> Option<Note> {
    let mut updated = note.clone();
    if let Some(title) = title {
        updated.title = title;
    }
    if let Some(content) = content {
        updated.tags = extract_tags(&content);
        updated.content = content;
    }

    if !updated.has_changes(note) {
        return None;
    }
    updated.touch();
    Some(updated)
}
