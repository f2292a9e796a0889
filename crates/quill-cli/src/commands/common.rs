use std::env;
use std::fs::File;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process::Command;

use chrono::Utc;
use quill_core::config::{RepositoryConfig, API_BASE_ENV, DATA_DIR_ENV};
use quill_core::filter::sort_notes;
use quill_core::{Note, NoteId, NoteRepository};
use serde::Serialize;

use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub relative_time: String,
    pub favorite: bool,
    pub tags: Vec<String>,
}

/// Repository settings from flags, falling back to the environment.
pub fn resolve_config(cli_data_dir: Option<PathBuf>, cli_api_base: Option<String>) -> RepositoryConfig {
    let data_dir = cli_data_dir
        .or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(default_data_dir);
    let api_base = cli_api_base.or_else(|| env::var(API_BASE_ENV).ok());
    build_config(data_dir, api_base)
}

pub fn build_config(data_dir: PathBuf, api_base: Option<String>) -> RepositoryConfig {
    RepositoryConfig::new(data_dir).with_api_base(api_base)
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quill")
}

pub fn open_repository(config: &RepositoryConfig) -> Result<NoteRepository, CliError> {
    Ok(NoteRepository::from_config(config)?)
}

/// Every stored note, newest first.
pub async fn load_notes(repo: &NoteRepository) -> Result<Vec<Note>, CliError> {
    let mut notes = repo.list().await?;
    sort_notes(&mut notes);
    Ok(notes)
}

/// Find a note by full id, or by a prefix matching exactly one id.
pub fn resolve_note(notes: &[Note], note_query: &str) -> Result<Note, CliError> {
    if let Some(note) = notes.iter().find(|note| note.id.as_str() == note_query) {
        return Ok(note.clone());
    }

    let matches = notes
        .iter()
        .filter(|note| note.id.as_str().starts_with(note_query))
        .collect::<Vec<_>>();

    match matches.as_slice() {
        [] => Err(CliError::NoteNotFound(note_query.to_string())),
        [note] => Ok((*note).clone()),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|note| short_id(&note.id))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{note_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(id: &NoteId) -> String {
    id.as_str().chars().take(SHORT_ID_LEN).collect()
}

pub fn format_note_lines(notes: &[&Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let short_id = short_id(&note.id);
            let star = if note.favorite { '*' } else { ' ' };
            let title = truncate_chars(note.display_title(), 30);
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.sort_timestamp(), now_ms);
            let tags = render_tags(note);

            if tags.is_empty() {
                format!("{short_id:<13} {star} {title:<30}  {preview:<40}  {relative_time}")
            } else {
                format!(
                    "{short_id:<13} {star} {title:<30}  {preview:<40}  {relative_time:<10}  {tags}"
                )
            }
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    NoteListItem {
        id: note.id.to_string(),
        title: note.display_title().to_string(),
        preview: note_preview(note, 80),
        content: note.content.clone(),
        created_at: note.created_at,
        updated_at: note.updated_at,
        relative_time: format_relative_time(note.sort_timestamp(), now_ms),
        favorite: note.favorite,
        tags: note.tags.clone(),
    }
}

pub fn print_notes(notes: &[&Note], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json_items = notes
            .iter()
            .map(|note| note_to_list_item(note))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(notes) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = text.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

fn render_tags(note: &Note) -> String {
    note.tags
        .iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Largest unit first; a timestamp less than a minute old is "just now".
const AGE_UNITS: [(i64, &str); 6] = [
    (365 * DAY_MS, "y"),
    (30 * DAY_MS, "mo"),
    (7 * DAY_MS, "w"),
    (DAY_MS, "d"),
    (HOUR_MS, "h"),
    (MINUTE_MS, "m"),
];

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let age = now_ms.saturating_sub(timestamp_ms);
    AGE_UNITS
        .iter()
        .find(|(span, _)| age >= *span)
        .map_or_else(
            || "just now".to_string(),
            |(span, suffix)| format!("{}{suffix} ago", age / span),
        )
}

/// Content from arguments, then piped stdin, then the user's editor.
pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        if let Some(content) = read_content(stdin.lock())? {
            return Ok(content);
        }
    }

    edit_in_editor("")?.ok_or(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` is a no.
pub fn confirm(prompt: &str) -> Result<bool, CliError> {
    let stdin = io::stdin();
    confirm_with(&mut stdin.lock(), &mut io::stderr(), prompt)
}

pub fn confirm_with(
    input: &mut impl BufRead,
    output: &mut impl Write,
    prompt: &str,
) -> Result<bool, CliError> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Everything `reader` yields, trimmed; `None` when it is blank.
pub fn read_content(mut reader: impl Read) -> Result<Option<String>, CliError> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

/// Open `initial_content` in the user's editor and return what was saved.
pub fn edit_in_editor(initial_content: &str) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let (program, args) = split_editor_command(&editor)
        .ok_or_else(|| CliError::EditorFailed("empty editor command".to_string()))?;

    let mut scratch = tempfile::Builder::new()
        .prefix("quill-note-")
        .suffix(".md")
        .tempfile()?;
    scratch.write_all(initial_content.as_bytes())?;
    scratch.flush()?;

    let status = Command::new(program).args(args).arg(scratch.path()).status()?;
    if !status.success() {
        return Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        )));
    }

    read_content(File::open(scratch.path())?)
}

/// Split an editor setting such as `code --wait` into program and arguments.
pub fn split_editor_command(editor: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = editor.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}

fn preferred_editor() -> String {
    ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}
