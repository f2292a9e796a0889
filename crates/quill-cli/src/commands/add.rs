use quill_core::config::RepositoryConfig;
use quill_core::models::extract_tags;
use quill_core::Note;

use crate::commands::common::{open_repository, resolve_note_content};
use crate::error::CliError;

pub async fn run_add(
    title: Option<&str>,
    content_parts: &[String],
    config: &RepositoryConfig,
) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;
    let note = build_note(title, content);

    let repo = open_repository(config)?;
    let saved = repo.upsert(note).await?;

    println!("{}", saved.id);
    Ok(())
}

pub fn build_note(title: Option<&str>, content: String) -> Note {
    let mut note = Note::new(title.unwrap_or_default(), content);
    note.tags = extract_tags(&note.content);
    note
}
