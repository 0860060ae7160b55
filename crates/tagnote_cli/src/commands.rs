//! Argument parsing and command execution.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::PathBuf;
use tagnote_core::{NoteData, NoteQuery, Notebook, NotebookError, Tag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    TagAdd {
        label: String,
    },
    TagList,
    TagRename {
        id: String,
        label: String,
    },
    TagDelete {
        id: String,
    },
    NoteNew {
        title: String,
        body: String,
        tags: Vec<String>,
    },
    /// `None` fields keep the current value.
    NoteEdit {
        id: String,
        title: Option<String>,
        body: Option<String>,
        tags: Option<Vec<String>>,
    },
    NoteShow {
        id: String,
    },
    NoteDelete {
        id: String,
    },
    List {
        title: String,
        tags: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(String);

impl Display for UsageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for UsageError {}

#[derive(Debug)]
pub enum CliError {
    Notebook(NotebookError),
    Io(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notebook(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Notebook(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<NotebookError> for CliError {
    fn from(value: NotebookError) -> Self {
        Self::Notebook(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub fn usage() -> &'static str {
    "usage: tagnote [--db PATH] [--config PATH] <command>

commands:
  tag add <label>
  tag list
  tag rename <id> <label>
  tag delete <id>
  note new <title> [--body TEXT] [--tag ID]...
  note edit <id> [--title TEXT] [--body TEXT] [--tag ID]... [--clear-tags]
  note show <id>
  note delete <id>
  list [--title TEXT] [--tag ID]...
  version
  help"
}

pub fn parse_args(args: &[String]) -> Result<Invocation, UsageError> {
    let mut db = None;
    let mut config = None;
    let mut rest = args;

    loop {
        match rest.first().map(String::as_str) {
            Some("--db") => {
                db = Some(PathBuf::from(value_after(rest, "--db")?));
                rest = &rest[2..];
            }
            Some("--config") => {
                config = Some(PathBuf::from(value_after(rest, "--config")?));
                rest = &rest[2..];
            }
            _ => break,
        }
    }

    let command = parse_command(rest)?;
    Ok(Invocation {
        db,
        config,
        command,
    })
}

fn parse_command(args: &[String]) -> Result<Command, UsageError> {
    let words: Vec<&str> = args.iter().map(String::as_str).collect();
    match words.as_slice() {
        [] | ["help"] | ["--help"] | ["-h"] => Ok(Command::Help),
        ["version"] | ["--version"] => Ok(Command::Version),
        ["tag", "add", label] => Ok(Command::TagAdd {
            label: label.to_string(),
        }),
        ["tag", "list"] => Ok(Command::TagList),
        ["tag", "rename", id, label] => Ok(Command::TagRename {
            id: id.to_string(),
            label: label.to_string(),
        }),
        ["tag", "delete", id] => Ok(Command::TagDelete { id: id.to_string() }),
        ["note", "new", title, flags @ ..] => {
            let flags = parse_flags(flags)?;
            if flags.clear_tags {
                return Err(usage_error("--clear-tags is only valid for `note edit`"));
            }
            Ok(Command::NoteNew {
                title: title.to_string(),
                body: flags.body.unwrap_or_default(),
                tags: flags.tags,
            })
        }
        ["note", "edit", id, flags @ ..] => {
            let flags = parse_flags(flags)?;
            let tags = match (flags.clear_tags, flags.tags.is_empty()) {
                (true, true) => Some(Vec::new()),
                (true, false) => {
                    return Err(usage_error("--clear-tags cannot be combined with --tag"))
                }
                (false, true) => None,
                (false, false) => Some(flags.tags),
            };
            Ok(Command::NoteEdit {
                id: id.to_string(),
                title: flags.title,
                body: flags.body,
                tags,
            })
        }
        ["note", "show", id] => Ok(Command::NoteShow { id: id.to_string() }),
        ["note", "delete", id] => Ok(Command::NoteDelete { id: id.to_string() }),
        ["list", flags @ ..] => {
            let flags = parse_flags(flags)?;
            if flags.body.is_some() || flags.clear_tags {
                return Err(usage_error("`list` accepts only --title and --tag"));
            }
            Ok(Command::List {
                title: flags.title.unwrap_or_default(),
                tags: flags.tags,
            })
        }
        _ => Err(usage_error(format!("unknown command `{}`", words.join(" ")))),
    }
}

#[derive(Debug, Default)]
struct Flags {
    title: Option<String>,
    body: Option<String>,
    tags: Vec<String>,
    clear_tags: bool,
}

fn parse_flags(args: &[&str]) -> Result<Flags, UsageError> {
    let mut flags = Flags::default();
    let mut index = 0;
    while index < args.len() {
        match args[index] {
            "--clear-tags" => {
                flags.clear_tags = true;
                index += 1;
                continue;
            }
            flag @ ("--title" | "--body" | "--tag") => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| usage_error(format!("{flag} requires a value")))?
                    .to_string();
                match flag {
                    "--title" => flags.title = Some(value),
                    "--body" => flags.body = Some(value),
                    _ => flags.tags.push(value),
                }
                index += 2;
            }
            other => return Err(usage_error(format!("unexpected argument `{other}`"))),
        }
    }
    Ok(flags)
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Result<&'a str, UsageError> {
    args.get(1)
        .map(String::as_str)
        .ok_or_else(|| usage_error(format!("{flag} requires a value")))
}

fn usage_error(message: impl Into<String>) -> UsageError {
    UsageError(message.into())
}

/// Runs one command against an open notebook.
pub fn execute(
    notebook: &mut Notebook,
    command: &Command,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Help => writeln!(out, "{}", usage())?,
        Command::Version => writeln!(out, "tagnote {}", tagnote_core::core_version())?,
        Command::TagAdd { label } => {
            let tag = notebook.create_tag(label)?;
            writeln!(out, "{}", tag.id)?;
        }
        Command::TagList => {
            for tag in notebook.tags() {
                writeln!(out, "{}\t{}", tag.id, tag.label)?;
            }
        }
        Command::TagRename { id, label } => notebook.rename_tag(id, label)?,
        Command::TagDelete { id } => {
            let deletion = notebook.delete_tag(id)?;
            writeln!(
                out,
                "deleted tag {} ({} notes untagged)",
                deletion.tag.label, deletion.untagged_notes
            )?;
        }
        Command::NoteNew { title, body, tags } => {
            let data = NoteData::new(title.as_str(), body.as_str()).with_tags(tags.iter().cloned());
            let note = notebook.create_note(data)?;
            writeln!(out, "{}", note.id)?;
        }
        Command::NoteEdit {
            id,
            title,
            body,
            tags,
        } => {
            let mut data = notebook.note(id)?.data;
            if let Some(title) = title {
                data.title = title.clone();
            }
            if let Some(body) = body {
                data.markdown = body.clone();
            }
            if let Some(tags) = tags {
                data.tag_ids = tags.clone();
            }
            notebook.update_note(id, data)?;
        }
        Command::NoteShow { id } => {
            let note = notebook.note(id)?;
            let tags = note.resolve_tags(&notebook.tags());
            writeln!(out, "# {}", note.title())?;
            writeln!(out, "id: {}", note.id)?;
            writeln!(out, "tags: {}", join_labels(&tags))?;
            writeln!(out)?;
            writeln!(out, "{}", note.markdown())?;
        }
        Command::NoteDelete { id } => {
            let note = notebook.delete_note(id)?;
            writeln!(out, "deleted note {}", note.title())?;
        }
        Command::List { title, tags } => {
            let query = NoteQuery::new()
                .with_title(title.as_str())
                .with_tags(tags.iter().cloned());
            for note in notebook.list(&query) {
                writeln!(out, "{}\t{}\t[{}]", note.id, note.title, join_labels(&note.tags))?;
            }
        }
    }
    Ok(())
}

fn join_labels(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| tag.label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
