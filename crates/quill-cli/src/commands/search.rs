use quill_core::config::RepositoryConfig;
use quill_core::filter::filter_notes;

use crate::commands::common::{load_notes, normalize_search_query, open_repository, print_notes};
use crate::error::CliError;

pub async fn run_search(
    query: &str,
    favorites: bool,
    limit: usize,
    as_json: bool,
    config: &RepositoryConfig,
) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let repo = open_repository(config)?;
    let notes = load_notes(&repo).await?;

    let matches = filter_notes(&notes, &normalized_query, favorites)
        .into_iter()
        .take(limit)
        .collect::<Vec<_>>();

    print_notes(&matches, as_json)
}
