use clap::{Parser, Subcommand};

use crate::models::{TagKey, TagKind};

/// One session line, parsed.
#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub struct Line {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, edit, delete or list notes
    #[command(subcommand)]
    Note(NoteCommand),

    /// Create, rename, delete or list tags
    #[command(subcommand)]
    Tag(TagCommand),

    /// Point a note's reference at a registered tag
    Attach {
        note: i64,
        kind: TagKind,
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },

    /// Clear a note's reference
    Detach { note: i64, kind: TagKind },

    /// Start dragging a tag and print its payload
    Drag { kind: TagKind, key: TagKey },

    /// Drop a payload (or the drag in flight) onto a note
    Drop {
        note: i64,
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        payload: Vec<String>,
    },

    /// Abandon the drag in flight
    Cancel,

    /// Print the date → time → character timeline
    Timeline {
        /// Split each time bucket by place
        #[arg(long)]
        places: bool,
    },

    /// Collapse or expand a timeline bucket
    #[command(subcommand)]
    Fold(FoldCommand),
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    Add {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    Rm {
        id: i64,
    },
    Edit {
        id: i64,
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    List,
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    Add {
        kind: TagKind,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
        #[arg(long)]
        color: Option<String>,
    },
    Rename {
        kind: TagKind,
        key: TagKey,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
        #[arg(long)]
        color: Option<String>,
    },
    Rm {
        kind: TagKind,
        key: TagKey,
    },
    List {
        kind: TagKind,
    },
    Color {
        kind: TagKind,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FoldCommand {
    Date { date: usize },
    Time { date: usize, time: usize },
    Place { date: usize, time: usize, place: usize },
}

impl Line {
    /// Parses one tokenized line.
    pub fn parse(tokens: &[String]) -> Result<Self, String> {
        Self::try_parse_from(tokens).map_err(|err| {
            // clap renders a multi-line usage block; keep the first line
            let rendered = err.to_string();
            rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ")
                .to_string()
        })
    }
}

/// Joins multi-word arguments back into one string.
pub fn joined(words: &[String]) -> String {
    words.join(" ")
}

/// Splits a line into tokens.
///
/// Tokens are separated by whitespace. Double quotes group words into one
/// token and may produce an empty token. A backslash escapes a double
/// quote or another backslash; any other backslash is kept as-is.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn tokenize(line: &str) -> Result<Option<Vec<String>>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('"') | Some('\\')) => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
                in_token = true;
            }
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(Some(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        tokenize(line).unwrap().unwrap()
    }

    #[test]
    fn tokenize_splits_on_whitespace() {
        assert_eq!(tokens("  note   add  hello "), ["note", "add", "hello"]);
    }

    #[test]
    fn tokenize_groups_quoted_words() {
        assert_eq!(
            tokens(r##"tag add character "Dr. A" --color "#ff0000""##),
            ["tag", "add", "character", "Dr. A", "--color", "#ff0000"]
        );
        assert_eq!(tokens(r#"note add """#), ["note", "add", ""]);
    }

    #[test]
    fn tokenize_handles_escaped_quotes() {
        assert_eq!(
            tokens(r#"drop 1 "{\"id\":1}""#),
            ["drop", "1", r#"{"id":1}"#]
        );
        assert_eq!(tokens(r"path a\b"), ["path", r"a\b"]);
    }

    #[test]
    fn tokenize_skips_blank_and_comment_lines() {
        assert_eq!(tokenize("   "), Ok(None));
        assert_eq!(tokenize("# setup"), Ok(None));
    }

    #[test]
    fn tokenize_rejects_unterminated_quote() {
        assert!(tokenize(r#"note add "oops"#).is_err());
    }

    #[test]
    fn parse_reads_multi_word_names_and_options() {
        let line = Line::parse(&tokens("tag add place 古い 書斎 --color #00ff00")).unwrap();

        match line.command {
            Command::Tag(TagCommand::Add { kind, name, color }) => {
                assert_eq!(kind, TagKind::Place);
                assert_eq!(joined(&name), "古い 書斎");
                assert_eq!(color.as_deref(), Some("#00ff00"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_reads_position_keys() {
        let line = Line::parse(&tokens("tag rm date @1")).unwrap();

        assert!(matches!(
            line.command,
            Command::Tag(TagCommand::Rm {
                kind: TagKind::Date,
                key: TagKey::Position(1)
            })
        ));
    }

    #[test]
    fn parse_keeps_hyphenated_note_text() {
        let line = Line::parse(&tokens("note add knife -under the bed")).unwrap();

        match line.command {
            Command::Note(NoteCommand::Add { text }) => {
                assert_eq!(joined(&text), "knife -under the bed");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_collects_a_spaced_drop_payload() {
        let line = Line::parse(&tokens(r#"drop 7 {\"id\": 1, \"type\": \"place\"}"#)).unwrap();

        match line.command {
            Command::Drop { note, payload } => {
                assert_eq!(note, 7);
                assert_eq!(joined(&payload), r#"{"id": 1, "type": "place"}"#);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(matches!(
            Line::parse(&tokens("drop 7")).unwrap().command,
            Command::Drop { payload, .. } if payload.is_empty()
        ));
    }

    #[test]
    fn parse_errors_are_single_line() {
        let err = Line::parse(&tokens("tag add weather rain")).unwrap_err();

        assert!(!err.contains('\n'));
        assert!(err.contains("weather"));
    }

    #[test]
    fn parse_rejects_unknown_commands() {
        assert!(Line::parse(&tokens("teleport 3")).is_err());
    }
}
