use std::path::PathBuf;

use pretty_assertions::assert_eq;
use quill_core::config::PersistenceMode;
use quill_core::{Key, KeyInput, Note, NoteId, NoteRepository, NotesApp, Section};

use crate::cli::CompletionShell;
use crate::commands::add::build_note;
use crate::commands::common::{
    build_config, confirm_with, default_editor, format_relative_time, normalize_content,
    normalize_note_identifier, normalize_search_query, note_preview, read_content, resolve_note,
    split_editor_command,
};
use crate::commands::completions::{render_completions, run_completions};
use crate::commands::edit::apply_edit;
use crate::commands::list::select_notes;
use crate::commands::shell::{execute, parse_command, render_list, Flow, ShellCommand};
use crate::commands::status::status_lines;
use crate::error::CliError;

fn note_with_id(id: &str, title: &str) -> Note {
    let mut note = Note::new(title, "");
    note.id = NoteId::from(id);
    note
}

fn local_app(dir: &tempfile::TempDir) -> NotesApp {
    let config = build_config(dir.path().to_path_buf(), None);
    NotesApp::new(NoteRepository::from_config(&config).unwrap())
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_content_keeps_multiline_text() {
    assert_eq!(
        normalize_content("line 1\nline 2\n"),
        Some("line 1\nline 2".to_string())
    );
}

#[test]
fn blank_identifiers_and_queries_are_rejected() {
    assert!(matches!(
        normalize_note_identifier("   "),
        Err(CliError::EmptyNoteId)
    ));
    assert!(matches!(
        normalize_search_query(""),
        Err(CliError::EmptySearchQuery)
    ));
    assert_eq!(normalize_search_query("  cat ").unwrap(), "cat");
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn format_relative_time_long_spans_and_future() {
    let day = 24 * 60 * 60_000;
    let now = 1000 * day;
    assert_eq!(format_relative_time(now - 3 * day, now), "3d ago");
    assert_eq!(format_relative_time(now - 14 * day, now), "2w ago");
    assert_eq!(format_relative_time(now - 65 * day, now), "2mo ago");
    assert_eq!(format_relative_time(now - 800 * day, now), "2y ago");
    assert_eq!(format_relative_time(now + day, now), "just now");
}

#[test]
fn split_editor_command_keeps_arguments() {
    assert_eq!(
        split_editor_command("code --wait"),
        Some(("code", vec!["--wait"]))
    );
    assert_eq!(split_editor_command("vi"), Some(("vi", vec![])));
    assert_eq!(split_editor_command("  "), None);
}

#[test]
fn read_content_trims_and_skips_blank_input() {
    assert_eq!(
        read_content("  piped note\n".as_bytes()).unwrap(),
        Some("piped note".to_string())
    );
    assert_eq!(read_content("\n\n".as_bytes()).unwrap(), None);
}

#[test]
fn note_preview_truncates_with_ellipsis() {
    let note = Note::new("", "This is a very long sentence that should be shortened");
    let preview = note_preview(&note, 20);
    assert_eq!(preview, "This is a very lo...");
}

#[test]
fn build_config_picks_mode_from_api_base() {
    let local = build_config(PathBuf::from("/tmp/quill"), Some("  ".to_string()));
    assert_eq!(local.mode(), PersistenceMode::Local);

    let remote = build_config(
        PathBuf::from("/tmp/quill"),
        Some("https://notes.example.com/".to_string()),
    );
    assert_eq!(remote.mode(), PersistenceMode::Api);
    assert_eq!(remote.api_base(), Some("https://notes.example.com"));
}

#[test]
fn status_lines_show_location_for_mode() {
    let local = build_config(PathBuf::from("/tmp/quill"), None);
    assert_eq!(
        status_lines(&local, 3),
        vec!["Mode:  local", "Data:  /tmp/quill", "Notes: 3"]
    );

    let remote = build_config(
        PathBuf::from("/tmp/quill"),
        Some("https://notes.example.com".to_string()),
    );
    assert_eq!(status_lines(&remote, 0)[1], "API:   https://notes.example.com");
}

#[test]
fn resolve_note_accepts_full_id_and_unique_prefix() {
    let notes = vec![
        note_with_id("0190aaaa-1111", "First"),
        note_with_id("0190aaab-2222", "Second"),
        note_with_id("0190bbbb-3333", "Third"),
    ];

    assert_eq!(resolve_note(&notes, "0190aaab-2222").unwrap().title, "Second");
    assert_eq!(resolve_note(&notes, "0190b").unwrap().title, "Third");
    assert!(matches!(
        resolve_note(&notes, "0190aa"),
        Err(CliError::AmbiguousNoteId(_))
    ));
    assert!(matches!(
        resolve_note(&notes, "ffff"),
        Err(CliError::NoteNotFound(_))
    ));
}

#[test]
fn build_note_extracts_tags_and_defaults_title() {
    let note = build_note(None, "Buy milk #Shopping #errands".to_string());
    assert_eq!(note.title, "Untitled");
    assert_eq!(note.tags, vec!["errands", "shopping"]);

    let titled = build_note(Some("Groceries"), "milk".to_string());
    assert_eq!(titled.title, "Groceries");
}

#[test]
fn apply_edit_reports_no_change() {
    let note = Note::new("Title", "body #old");
    assert!(apply_edit(&note, Some("Title".to_string()), None).is_none());

    let edited = apply_edit(&note, None, Some("body #new".to_string())).unwrap();
    assert_eq!(edited.content, "body #new");
    assert_eq!(edited.tags, vec!["new"]);
    assert!(edited.updated_at >= note.updated_at);
}

#[test]
fn select_notes_applies_favorites_tag_and_limit() {
    let mut work = Note::new("Work", "");
    work.tags = vec!["work".to_string()];
    work.favorite = true;
    let mut home = Note::new("Home", "");
    home.tags = vec!["home".to_string()];
    let notes = vec![work, home, Note::new("Other", "")];

    assert_eq!(select_notes(&notes, false, None, 2).len(), 2);
    assert_eq!(select_notes(&notes, true, None, 10)[0].title, "Work");
    assert_eq!(select_notes(&notes, false, Some("HOME"), 10)[0].title, "Home");
}

#[test]
fn confirm_accepts_only_yes() {
    let mut output = Vec::new();
    assert!(confirm_with(&mut "y\n".as_bytes(), &mut output, "Delete?").unwrap());
    assert!(confirm_with(&mut "YES\n".as_bytes(), &mut output, "Delete?").unwrap());
    assert!(!confirm_with(&mut "\n".as_bytes(), &mut output, "Delete?").unwrap());
    assert!(!confirm_with(&mut "".as_bytes(), &mut output, "Delete?").unwrap());
    assert!(String::from_utf8(output).unwrap().starts_with("Delete? [y/N] "));
}

#[test]
fn completions_mention_binary_name() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("quill"));
}

#[test]
fn completions_can_be_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("completions").join("quill.fish");
    run_completions(CompletionShell::Fish, Some(&path)).unwrap();
    assert!(!std::fs::read_to_string(path).unwrap().is_empty());
}

#[test]
fn completions_cover_powershell() {
    let script = String::from_utf8(render_completions(CompletionShell::PowerShell)).unwrap();
    assert!(script.contains("quill"));
}

#[test]
fn parse_command_recognizes_shell_vocabulary() {
    assert_eq!(parse_command("   ").unwrap(), None);
    assert_eq!(parse_command("new").unwrap(), Some(ShellCommand::New));
    assert_eq!(
        parse_command("title  Weekly plan ").unwrap(),
        Some(ShellCommand::Title("Weekly plan".to_string()))
    );
    assert_eq!(
        parse_command("content one\\ntwo").unwrap(),
        Some(ShellCommand::Content("one\ntwo".to_string()))
    );
    assert_eq!(
        parse_command("search").unwrap(),
        Some(ShellCommand::Search(String::new()))
    );
    assert_eq!(
        parse_command("section favorites").unwrap(),
        Some(ShellCommand::Section(Section::Favorites))
    );
    assert_eq!(
        parse_command("ctrl-f").unwrap(),
        Some(ShellCommand::Key(KeyInput::new(Key::Char('f')).with_ctrl()))
    );
    assert_eq!(
        parse_command("DOWN").unwrap(),
        Some(ShellCommand::Key(KeyInput::new(Key::Down)))
    );
    assert_eq!(parse_command("quit").unwrap(), Some(ShellCommand::Quit));
}

#[test]
fn parse_command_rejects_bad_input() {
    assert!(parse_command("open").is_err());
    assert!(parse_command("section recent").is_err());
    assert!(parse_command("frobnicate").is_err());
}

#[tokio::test]
async fn shell_creates_edits_and_saves_a_note() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = local_app(&dir);
    app.load().await;
    let mut out = Vec::new();

    execute(&mut app, ShellCommand::New, &mut out).await.unwrap();
    execute(&mut app, ShellCommand::Title("Plan".to_string()), &mut out)
        .await
        .unwrap();
    execute(&mut app, ShellCommand::Content("ship it".to_string()), &mut out)
        .await
        .unwrap();
    execute(&mut app, ShellCommand::Save, &mut out).await.unwrap();
    app.process_save_outcomes();

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("Saved"));

    let mut reopened = local_app(&dir);
    reopened.load().await;
    let stored = reopened.active_note().unwrap();
    assert_eq!(stored.title, "Plan");
    assert_eq!(stored.content, "ship it");
}

#[tokio::test]
async fn shell_open_by_number_and_delete_asks_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = local_app(&dir);
    let first = app.create_note().await.unwrap();
    let second = app.create_note().await.unwrap();
    let mut out = Vec::new();

    execute(&mut app, ShellCommand::Open("2".to_string()), &mut out)
        .await
        .unwrap();
    assert_eq!(app.active_id(), Some(&first));

    let flow = execute(&mut app, ShellCommand::Delete, &mut out)
        .await
        .unwrap();
    assert_eq!(flow, Flow::ConfirmDelete(first));
    assert_eq!(app.notes().len(), 2);

    execute(&mut app, ShellCommand::Key(KeyInput::new(Key::Up)), &mut out)
        .await
        .unwrap();
    assert_eq!(app.active_id(), Some(&second));

    assert_eq!(
        execute(&mut app, ShellCommand::Quit, &mut out).await.unwrap(),
        Flow::Quit
    );
}

#[tokio::test]
async fn shell_list_marks_active_and_favorites() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = local_app(&dir);
    app.create_note().await.unwrap();
    let mut out = Vec::new();

    execute(&mut app, ShellCommand::Favorite, &mut out)
        .await
        .unwrap();
    let lines = render_list(&app);

    assert_eq!(lines[0], "All notes (1 of 1)");
    assert!(lines[1].starts_with(">  1. * Untitled"));

    execute(&mut app, ShellCommand::Search("nothing".to_string()), &mut out)
        .await
        .unwrap();
    let lines = render_list(&app);
    assert_eq!(lines[0], "All notes (0 of 1), search \"nothing\"");
    assert_eq!(lines[1], "  (no notes)");
}

#[tokio::test]
async fn shell_open_unknown_note_keeps_session_running() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = local_app(&dir);
    let active = app.create_note().await.unwrap();
    app.editor_mut().set_content("draft in progress");
    let mut out = Vec::new();

    let flow = execute(&mut app, ShellCommand::Open("zzz".to_string()), &mut out)
        .await
        .unwrap();

    assert_eq!(flow, Flow::Continue);
    assert!(String::from_utf8(out).unwrap().contains("zzz"));
    assert_eq!(app.active_id(), Some(&active));
    assert_eq!(app.editor().draft().unwrap().content, "draft in progress");
}
