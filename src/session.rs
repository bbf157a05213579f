//! Line-oriented command sessions.
//!
//! A session owns one in-memory [`Workspace`] and applies commands to it
//! one line at a time, writing a reply for each. Rejected operations are
//! reported and skipped; only malformed lines stop a session.

mod command;
mod render;

pub use command::tokenize;

use std::io::{self, BufRead, Write};

use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::drag::{DropAction, MIME_TYPE};
use crate::error::Rejected;
use crate::models::{Color, NoteId};
use crate::service::Workspace;
use crate::timeline::FoldState;
use command::{Command, FoldCommand, Line, NoteCommand, TagCommand, joined};

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A line could not be parsed.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Reading commands or writing replies failed.
    #[error("session I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// How replies are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON document per line.
    Json,
}

/// Result of applying one command.
enum Reply {
    Done { text: String, data: Value },
    Ignored(String),
}

impl Reply {
    fn done(text: impl Into<String>, data: Value) -> Self {
        Self::Done {
            text: text.into(),
            data,
        }
    }

    fn ignored(reason: impl ToString) -> Self {
        Self::Ignored(reason.to_string())
    }
}

/// A command session over one workspace.
///
/// # Examples
///
/// ```
/// use casebook::session::{OutputFormat, Session};
///
/// let script = "tag add character A --color #ff0000\nnote add knife\nnote list\n";
/// let mut session = Session::new(Vec::new(), OutputFormat::Text);
/// session.run(script.as_bytes()).unwrap();
///
/// let output = String::from_utf8(session.into_output()).unwrap();
/// assert!(output.contains("knife"));
/// ```
pub struct Session<W> {
    workspace: Workspace,
    folds: FoldState,
    out: W,
    format: OutputFormat,
    lines_read: usize,
}

impl<W: Write> Session<W> {
    /// Starts a session over an empty workspace with default options.
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self::with_workspace(Workspace::new(), out, format)
    }

    /// Starts a session over an empty workspace configured by `config`.
    pub fn with_config(config: &Config, out: W, format: OutputFormat) -> Self {
        Self::with_workspace(Workspace::with_config(config), out, format)
    }

    pub fn with_workspace(workspace: Workspace, out: W, format: OutputFormat) -> Self {
        Self {
            workspace,
            folds: FoldState::new(),
            out,
            format,
            lines_read: 0,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Consumes the session and returns the writer.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs every line of `input`.
    ///
    /// # Errors
    ///
    /// Stops at the first line that cannot be parsed, or on I/O failure.
    pub fn run(&mut self, input: impl BufRead) -> Result<(), SessionError> {
        for line in input.lines() {
            self.execute(&line?)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Applies one line.
    ///
    /// Blank lines and comments are counted but do nothing.
    pub fn execute(&mut self, line: &str) -> Result<(), SessionError> {
        self.lines_read += 1;
        let line_no = self.lines_read;
        let syntax = |message| SessionError::Syntax {
            line: line_no,
            message,
        };

        let Some(tokens) = tokenize(line).map_err(syntax)? else {
            return Ok(());
        };
        let parsed = Line::parse(&tokens).map_err(syntax)?;
        debug!(line = line_no, command = ?parsed.command, "executing");

        let reply = self.apply(parsed.command);
        self.write(reply)?;
        Ok(())
    }

    fn apply(&mut self, command: Command) -> Reply {
        match command {
            Command::Note(command) => self.apply_note(command),
            Command::Tag(command) => self.apply_tag(command),
            Command::Attach { note, kind, value } => {
                let id = NoteId::new(note);
                let value = joined(&value);
                match self.workspace.attach_tag(id, kind, &value) {
                    Ok(()) => Reply::done(
                        format!("note {id}: {kind} = {value}"),
                        json!({ "note": id, "kind": kind, "value": value }),
                    ),
                    Err(reason) => Reply::ignored(reason),
                }
            }
            Command::Detach { note, kind } => {
                let id = NoteId::new(note);
                match self.workspace.detach_tag(id, kind) {
                    Ok(previous) => Reply::done(
                        format!("note {id}: {kind} cleared"),
                        json!({ "note": id, "kind": kind, "previous": previous }),
                    ),
                    Err(reason) => Reply::ignored(reason),
                }
            }
            Command::Drag { kind, key } => match self.workspace.begin_drag(kind, key) {
                Ok(payload) => {
                    let data = serde_json::from_str(&payload).unwrap_or(Value::Null);
                    Reply::done(payload, json!({ "dragging": data, "channel": MIME_TYPE }))
                }
                Err(reason) => Reply::ignored(reason),
            },
            Command::Drop { note, payload } => {
                let id = NoteId::new(note);
                let payload = if payload.is_empty() {
                    self.workspace.dragging().map(|p| p.encode())
                } else {
                    Some(joined(&payload))
                };
                match self.workspace.drop_on_note(id, payload.as_deref()) {
                    Ok(action) => {
                        let text = match &action {
                            DropAction::Attach { kind, text } => {
                                format!("note {id}: {kind} = {text}")
                            }
                            DropAction::Detach { kind } => {
                                format!("note {id}: {kind} cleared")
                            }
                        };
                        Reply::done(text, json!({ "note": id, "drop": action }))
                    }
                    Err(reason) => Reply::ignored(reason),
                }
            }
            Command::Cancel => {
                let was_dragging = self.workspace.dragging().is_some();
                self.workspace.end_drag();
                if was_dragging {
                    Reply::done("drag cancelled", json!({ "cancelled": true }))
                } else {
                    Reply::ignored("no drag in flight")
                }
            }
            Command::Timeline { places } => {
                let dates = self.workspace.group_for_timeline();
                let data = render::timeline_json(&self.workspace, &dates, &self.folds, places);
                let text = match self.format {
                    OutputFormat::Text => {
                        render::timeline_text(&self.workspace, &dates, &self.folds, places)
                    }
                    OutputFormat::Json => String::new(),
                };
                Reply::done(text, data)
            }
            Command::Fold(target) => self.apply_fold(target),
        }
    }

    fn apply_note(&mut self, command: NoteCommand) -> Reply {
        match command {
            NoteCommand::Add { text } => match self.workspace.add_note(&joined(&text)) {
                Ok(id) => Reply::done(format!("note {id} added"), json!({ "added": id })),
                Err(reason) => Reply::ignored(reason),
            },
            NoteCommand::Rm { id } => {
                let id = NoteId::new(id);
                if self.workspace.delete_note(id) {
                    Reply::done(format!("note {id} deleted"), json!({ "deleted": id }))
                } else {
                    Reply::ignored(Rejected::UnknownNote(id))
                }
            }
            NoteCommand::Edit { id, text } => {
                let id = NoteId::new(id);
                match self.workspace.edit_note_content(id, &joined(&text)) {
                    Ok(()) => Reply::done(format!("note {id} updated"), json!({ "updated": id })),
                    Err(reason) => Reply::ignored(reason),
                }
            }
            NoteCommand::List => {
                let notes = self.workspace.list_notes();
                Reply::done(render::notes_text(notes), render::notes_json(notes))
            }
        }
    }

    fn apply_tag(&mut self, command: TagCommand) -> Reply {
        match command {
            TagCommand::Add { kind, name, color } => {
                let name = joined(&name);
                match self.workspace.add_tag(kind, &name, color.map(Color::new)) {
                    Ok(id) => Reply::done(
                        format!("{kind} tag {id} added: {name}"),
                        json!({ "added": id, "kind": kind, "text": name }),
                    ),
                    Err(reason) => Reply::ignored(reason),
                }
            }
            TagCommand::Rename {
                kind,
                key,
                name,
                color,
            } => {
                let name = joined(&name);
                match self
                    .workspace
                    .rename_tag(kind, key, &name, color.map(Color::new))
                {
                    Ok(report) => Reply::done(
                        format!(
                            "{kind} '{}' renamed to '{name}' ({} notes updated)",
                            report.old_text, report.notes_touched
                        ),
                        json!({ "renamed": report }),
                    ),
                    Err(reason) => Reply::ignored(reason),
                }
            }
            TagCommand::Rm { kind, key } => match self.workspace.delete_tag(kind, key) {
                Ok(report) => Reply::done(
                    format!(
                        "{kind} '{}' deleted ({} notes cleared)",
                        report.old_text, report.notes_touched
                    ),
                    json!({ "deleted": report }),
                ),
                Err(reason) => Reply::ignored(reason),
            },
            TagCommand::List { kind } => {
                let tags = self.workspace.list_tags(kind);
                Reply::done(render::tags_text(kind, &tags), render::tags_json(kind, &tags))
            }
            TagCommand::Color { kind, name } => {
                let name = joined(&name);
                let color = self.workspace.color_of(kind, &name).to_string();
                Reply::done(
                    color.clone(),
                    json!({ "kind": kind, "text": name, "color": color }),
                )
            }
        }
    }

    fn apply_fold(&mut self, target: FoldCommand) -> Reply {
        let (address, expanded) = match target {
            FoldCommand::Date { date } => (format!("{date}"), self.folds.toggle_date(date)),
            FoldCommand::Time { date, time } => {
                (format!("{date}.{time}"), self.folds.toggle_time(date, time))
            }
            FoldCommand::Place { date, time, place } => (
                format!("{date}.{time}.{place}"),
                self.folds.toggle_place(date, time, place),
            ),
        };
        let state = if expanded { "expanded" } else { "folded" };
        Reply::done(
            format!("[{address}] {state}"),
            json!({ "bucket": address, "expanded": expanded }),
        )
    }

    fn write(&mut self, reply: Reply) -> io::Result<()> {
        match (self.format, reply) {
            (OutputFormat::Text, Reply::Done { text, .. }) => writeln!(self.out, "{text}"),
            (OutputFormat::Text, Reply::Ignored(reason)) => writeln!(self.out, "ignored: {reason}"),
            (OutputFormat::Json, Reply::Done { data, .. }) => writeln!(self.out, "{data}"),
            (OutputFormat::Json, Reply::Ignored(reason)) => {
                writeln!(self.out, "{}", json!({ "ignored": reason }))
            }
        }
    }
}
