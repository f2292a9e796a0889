use quill_core::config::RepositoryConfig;

use crate::commands::common::{
    confirm, load_notes, normalize_note_identifier, open_repository, resolve_note,
};
use crate::error::CliError;

pub async fn run_delete(id: &str, yes: bool, config: &RepositoryConfig) -> Result<(), CliError> {
    let normalized_id = normalize_note_identifier(id)?;
    let repo = open_repository(config)?;
    let notes = load_notes(&repo).await?;
    let note = resolve_note(&notes, &normalized_id)?;

    if !yes && !confirm(&format!("Delete \"{}\"?", note.display_title()))? {
        eprintln!("Cancelled");
        return Ok(());
    }

    repo.remove(&note.id).await?;
    println!("{}", note.id);
    Ok(())
}
