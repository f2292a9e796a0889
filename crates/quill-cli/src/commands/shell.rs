//! Line-oriented interactive session over [`NotesApp`].
//!
//! Edits go through the editor session, so they autosave after the usual
//! debounce window. Notifications raised in the background are printed
//! before the next prompt.

use std::io::{self, Write};

use chrono::Utc;
use quill_core::config::RepositoryConfig;
use quill_core::notify::NotificationKind;
use quill_core::{EditorStatus, Key, KeyInput, NoteBackend, NoteId, NotesApp, Section};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::common::{format_relative_time, is_yes, open_repository, resolve_note};
use crate::error::CliError;

const HELP: &str = "\
Commands:
  new                 create a note and open it
  open <N|ID>         open a note by list number or id prefix
  title <TEXT>        set the title of the open note
  content <TEXT>      set the content (\\n for line breaks)
  save                save now
  undo                discard unsaved edits
  fav                 toggle favorite on the open note
  delete              delete the open note (asks first)
  search [QUERY]      filter the list; no query clears it
  favorites           toggle the favorites-only filter
  section all|favorites
  up, down            move the selection
  del                 delete the selection without asking
  ctrl-f              toggle favorite on the selection
  list, show, help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    New,
    Open(String),
    Title(String),
    Content(String),
    Save,
    Undo,
    Favorite,
    Delete,
    Search(String),
    Favorites,
    Section(Section),
    Key(KeyInput),
    List,
    Show,
    Help,
    Quit,
}

/// What the loop does after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    ConfirmDelete(NoteId),
    Quit,
}

pub async fn run_shell(config: &RepositoryConfig) -> Result<(), CliError> {
    let repo = open_repository(config)?;
    let mode = repo.mode();
    let mut app = NotesApp::new(repo);
    app.load().await;

    let mut stdout = io::stdout();
    writeln!(stdout, "Quill shell ({mode} storage). Type `help` for commands.")?;
    write_lines(&mut stdout, &render_list(&app))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut seen = 0;
    loop {
        app.process_save_outcomes();
        seen = print_notifications(&mut app, seen, &mut stdout)?;

        write!(stdout, "quill> ")?;
        stdout.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(stdout)?;
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(stdout, "{message}")?;
                continue;
            }
        };

        match execute(&mut app, command, &mut stdout).await? {
            Flow::Continue => {}
            Flow::Quit => break,
            Flow::ConfirmDelete(id) => {
                let title = app
                    .note(&id)
                    .map(|note| note.display_title().to_string())
                    .unwrap_or_default();
                write!(stdout, "Delete \"{title}\"? [y/N] ")?;
                stdout.flush()?;

                let answer = lines.next_line().await?.unwrap_or_default();
                if is_yes(&answer) {
                    let _ = app.delete_note(&id).await;
                } else {
                    writeln!(stdout, "Cancelled")?;
                }
            }
        }
    }

    if app.editor().has_unsaved_changes() {
        let _ = app.editor_mut().save_now().await;
    }
    app.process_save_outcomes();
    print_notifications(&mut app, seen, &mut stdout)?;
    Ok(())
}

/// Parse one input line. Blank lines are `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_lowercase().as_str() {
        "new" | "n" => ShellCommand::New,
        "open" | "select" | "o" => {
            if rest.is_empty() {
                return Err("Usage: open <N|ID>".to_string());
            }
            ShellCommand::Open(rest.to_string())
        }
        "title" | "t" => ShellCommand::Title(rest.to_string()),
        "content" | "c" => ShellCommand::Content(rest.replace("\\n", "\n")),
        "save" | "w" => ShellCommand::Save,
        "undo" | "u" => ShellCommand::Undo,
        "fav" | "favorite" => ShellCommand::Favorite,
        "delete" | "rm" => ShellCommand::Delete,
        "search" | "/" => ShellCommand::Search(rest.to_string()),
        "favorites" => ShellCommand::Favorites,
        "section" => match rest.to_lowercase().as_str() {
            "all" => ShellCommand::Section(Section::All),
            "favorites" | "fav" => ShellCommand::Section(Section::Favorites),
            _ => return Err("Usage: section all|favorites".to_string()),
        },
        "up" | "k" => ShellCommand::Key(KeyInput::new(Key::Up)),
        "down" | "j" => ShellCommand::Key(KeyInput::new(Key::Down)),
        "del" => ShellCommand::Key(KeyInput::new(Key::Delete)),
        "ctrl-f" => ShellCommand::Key(KeyInput::new(Key::Char('f')).with_ctrl()),
        "cmd-f" => ShellCommand::Key(KeyInput::new(Key::Char('f')).with_meta()),
        "list" | "ls" => ShellCommand::List,
        "show" | "cat" => ShellCommand::Show,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("Unknown command `{other}`. Type `help` for commands.")),
    };

    Ok(Some(command))
}

pub async fn execute<B: NoteBackend + 'static>(
    app: &mut NotesApp<B>,
    command: ShellCommand,
    out: &mut impl Write,
) -> Result<Flow, CliError> {
    match command {
        ShellCommand::New => {
            if app.create_note().await.is_some() {
                write_lines(out, &render_active(app))?;
            }
        }
        ShellCommand::Open(query) => match resolve_selection(app, &query) {
            Ok(id) => {
                app.select(&id);
                write_lines(out, &render_active(app))?;
            }
            Err(error) => writeln!(out, "{error}")?,
        },
        ShellCommand::Title(title) => {
            if !app.editor_mut().set_title(title) {
                writeln!(out, "No note open")?;
            }
        }
        ShellCommand::Content(content) => {
            if !app.editor_mut().set_content(content) {
                writeln!(out, "No note open")?;
            }
        }
        ShellCommand::Save => match app.editor_mut().save_now().await {
            Ok(Some(_)) => writeln!(out, "Saved")?,
            Ok(None) => writeln!(out, "No note open")?,
            // Reported through the save outcome channel
            Err(_) => {}
        },
        ShellCommand::Undo => {
            app.editor_mut().undo();
            write_lines(out, &render_active(app))?;
        }
        ShellCommand::Favorite => {
            let Some(id) = app.active_id().cloned() else {
                writeln!(out, "No note open")?;
                return Ok(Flow::Continue);
            };
            if let Ok(saved) = app.toggle_favorite(&id).await {
                let state = if saved.favorite { "Favorited" } else { "Unfavorited" };
                writeln!(out, "{state} \"{}\"", saved.display_title())?;
            }
        }
        ShellCommand::Delete => {
            let Some(id) = app.active_id().cloned() else {
                writeln!(out, "No note open")?;
                return Ok(Flow::Continue);
            };
            return Ok(Flow::ConfirmDelete(id));
        }
        ShellCommand::Search(query) => {
            app.set_query(query);
            write_lines(out, &render_list(app))?;
        }
        ShellCommand::Favorites => {
            app.set_favorites_only(!app.favorites_only());
            write_lines(out, &render_list(app))?;
        }
        ShellCommand::Section(section) => {
            app.set_section(section);
            write_lines(out, &render_list(app))?;
        }
        ShellCommand::Key(input) => {
            if app.handle_key(input).await {
                write_lines(out, &render_list(app))?;
            }
        }
        ShellCommand::List => write_lines(out, &render_list(app))?,
        ShellCommand::Show => write_lines(out, &render_active(app))?,
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

/// A 1-based list number within the visible notes, or an id prefix.
fn resolve_selection<B: NoteBackend + 'static>(
    app: &NotesApp<B>,
    query: &str,
) -> Result<NoteId, CliError> {
    let visible = app.visible_notes();
    if let Ok(position) = query.parse::<usize>() {
        if let Some(note) = position.checked_sub(1).and_then(|index| visible.get(index)) {
            return Ok(note.id.clone());
        }
    }
    Ok(resolve_note(app.notes(), query)?.id)
}

pub fn render_list<B: NoteBackend + 'static>(app: &NotesApp<B>) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    let visible = app.visible_notes();

    let mut header = format!(
        "{} ({} of {})",
        app.section().label(),
        visible.len(),
        app.notes().len()
    );
    if !app.query().trim().is_empty() {
        header.push_str(&format!(", search \"{}\"", app.query().trim()));
    }
    if app.favorites_only() {
        header.push_str(", favorites only");
    }

    let mut lines = vec![header];
    if visible.is_empty() {
        lines.push("  (no notes)".to_string());
    }
    for (index, note) in visible.iter().enumerate() {
        let marker = if app.active_id() == Some(&note.id) { '>' } else { ' ' };
        let star = if note.favorite { '*' } else { ' ' };
        lines.push(format!(
            "{marker}{:>3}. {star} {}  ({})",
            index + 1,
            note.display_title(),
            format_relative_time(note.sort_timestamp(), now_ms)
        ));
    }
    lines
}

pub fn render_active<B: NoteBackend + 'static>(app: &NotesApp<B>) -> Vec<String> {
    let editor = app.editor();
    let Some(draft) = editor.draft() else {
        return vec!["No note open".to_string()];
    };

    let status = match editor.status() {
        EditorStatus::Saving => "saving",
        EditorStatus::Dirty => "unsaved",
        EditorStatus::Idle if editor.has_unsaved_changes() => "unsaved",
        EditorStatus::Idle => "saved",
    };
    let star = if draft.favorite { " *" } else { "" };

    let mut lines = vec![format!("# {}{star} [{status}]", draft.display_title())];
    lines.extend(draft.content.lines().map(str::to_string));
    lines
}

fn print_notifications<B: NoteBackend + 'static>(
    app: &mut NotesApp<B>,
    seen: u64,
    out: &mut impl Write,
) -> io::Result<u64> {
    for notification in app.notifications().since(seen) {
        let prefix = match notification.kind {
            NotificationKind::Info => "-",
            NotificationKind::Error => "!",
        };
        writeln!(out, "{prefix} {}", notification.message)?;
    }
    Ok(app.notifications().last_id())
}

fn write_lines(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
