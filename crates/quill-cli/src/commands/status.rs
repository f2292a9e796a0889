use quill_core::config::{PersistenceMode, RepositoryConfig};

use crate::commands::common::{load_notes, open_repository};
use crate::error::CliError;

pub async fn run_status(config: &RepositoryConfig) -> Result<(), CliError> {
    let repo = open_repository(config)?;
    let notes = load_notes(&repo).await?;

    for line in status_lines(config, notes.len()) {
        println!("{line}");
    }
    Ok(())
}

pub fn status_lines(config: &RepositoryConfig, note_count: usize) -> Vec<String> {
    let location = match (config.mode(), config.api_base()) {
        (PersistenceMode::Api, Some(base)) => format!("API:   {base}"),
        _ => format!("Data:  {}", config.data_dir().display()),
    };

    vec![
        format!("Mode:  {}", config.mode()),
        location,
        format!("Notes: {note_count}"),
    ]
}
