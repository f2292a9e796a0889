use quill_core::config::RepositoryConfig;
use quill_core::filter::NoteFilter;
use quill_core::Note;

use crate::commands::common::{load_notes, open_repository, print_notes};
use crate::error::CliError;

pub async fn run_list(
    limit: usize,
    favorites: bool,
    tag: Option<&str>,
    as_json: bool,
    config: &RepositoryConfig,
) -> Result<(), CliError> {
    let repo = open_repository(config)?;
    let notes = load_notes(&repo).await?;
    let selected = select_notes(&notes, favorites, tag, limit);

    print_notes(&selected, as_json)
}

pub fn select_notes<'a>(
    notes: &'a [Note],
    favorites: bool,
    tag: Option<&str>,
    limit: usize,
) -> Vec<&'a Note> {
    NoteFilter::new("", favorites)
        .with_tag(tag.map(str::to_string))
        .apply(notes)
        .into_iter()
        .take(limit)
        .collect()
}
