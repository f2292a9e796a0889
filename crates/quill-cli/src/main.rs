//! Quill CLI - notes from the terminal
//!
//! One-shot commands over the note repository plus an interactive shell
//! with autosave.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_config;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quill=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.data_dir, cli.api_base);

    match cli.command {
        Some(Commands::Add { title, content }) => {
            commands::add::run_add(title.as_deref(), &content, &config).await?;
        }
        Some(Commands::List {
            limit,
            favorites,
            tag,
            json,
        }) => {
            commands::list::run_list(limit, favorites, tag.as_deref(), json, &config).await?;
        }
        Some(Commands::Search {
            query,
            favorites,
            limit,
            json,
        }) => {
            commands::search::run_search(&query, favorites, limit, json, &config).await?;
        }
        Some(Commands::Edit { id, title, content }) => {
            commands::edit::run_edit(&id, title, content, &config).await?;
        }
        Some(Commands::Delete { id, yes }) => {
            commands::delete::run_delete(&id, yes, &config).await?;
        }
        Some(Commands::Favorite { id }) => commands::favorite::run_favorite(&id, &config).await?,
        Some(Commands::Status) => commands::status::run_status(&config).await?,
        Some(Commands::Shell) => commands::shell::run_shell(&config).await?,
        Some(Commands::Completions { shell, output }) => {
            commands::completions::run_completions(shell, output.as_deref())?;
        }
        None => {
            // Quick capture mode: quill "my note"
            if cli.note.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                commands::add::run_add(None, &cli.note, &config).await?;
            }
        }
    }

    Ok(())
}
