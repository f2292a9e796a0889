use quill_core::config::RepositoryConfig;

use crate::commands::common::{load_notes, normalize_note_identifier, open_repository, resolve_note};
use crate::error::CliError;

pub async fn run_favorite(id: &str, config: &RepositoryConfig) -> Result<(), CliError> {
    let normalized_id = normalize_note_identifier(id)?;
    let repo = open_repository(config)?;
    let notes = load_notes(&repo).await?;

    let mut note = resolve_note(&notes, &normalized_id)?;
    note.favorite = !note.favorite;
    note.touch();

    let saved = repo.upsert(note).await?;
    let state = if saved.favorite { "favorited" } else { "unfavorited" };
    println!("{} {state}", saved.id);
    Ok(())
}
