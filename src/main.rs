use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use casebook::Config;
use casebook::session::{OutputFormat, Session, SessionError};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// casebook - tag investigation notes and lay them out on a timeline
#[derive(Parser)]
#[command(name = "casebook")]
#[command(about = "Tag investigation notes and lay them out on a timeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run a command session against an in-memory casebook
    Session(SessionCommand),

    /// Print the effective configuration
    Config(ConfigCommand),
}

/// Run a command session
#[derive(Parser)]
struct SessionCommand {
    /// Script to run; reads stdin when omitted
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Write one JSON document per reply
    #[arg(long)]
    json: bool,
}

/// Print the effective configuration
#[derive(Parser)]
struct ConfigCommand {
    /// Print the configuration as one JSON document
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let result = Config::load().and_then(|config| {
        init_tracing(&config);
        match &cli.command {
            Commands::Session(cmd) => handle_session(cmd, &config),
            Commands::Config(cmd) => handle_config(cmd, &config),
        }
    });

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Installs the stderr subscriber, filtered by the configured directive.
///
/// Falls back to `warn` if the directive does not parse.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are malformed session lines and scripts that cannot be
/// found. Everything else is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<SessionError>(),
            Some(SessionError::Syntax { .. })
        ) || cause
            .downcast_ref::<io::Error>()
            .is_some_and(|err| err.kind() == io::ErrorKind::NotFound)
    })
}

/// Handles the session command by running the script or stdin.
fn handle_session(cmd: &SessionCommand, config: &Config) -> Result<()> {
    let format = if cmd.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut session = Session::with_config(config, io::stdout().lock(), format);

    match &cmd.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script: {}", path.display()))?;
            session.run(BufReader::new(file))
        }
        None => session.run(io::stdin().lock()),
    }
    .context("Session stopped")?;

    Ok(())
}

/// Handles the config command by printing every effective setting.
fn handle_config(cmd: &ConfigCommand, config: &Config) -> Result<()> {
    if cmd.json {
        println!("{}", config_json(config)?);
    } else {
        for line in config_lines(config) {
            println!("{line}");
        }
    }
    Ok(())
}

fn config_json(config: &Config) -> Result<String> {
    serde_json::to_string_pretty(config).context("Failed to serialize configuration")
}

fn config_lines(config: &Config) -> Vec<String> {
    vec![
        format!("log_filter = {}", config.log_filter),
        format!("drop_mode = {}", config.drop_mode),
        format!("unknown_date_last = {}", config.unknown_date_last),
        format!("unknown_date_label = {}", config.labels.date),
        format!("unknown_time_label = {}", config.labels.time),
        format!("unknown_character_label = {}", config.labels.character),
        format!("unknown_place_label = {}", config.labels.place),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_session_with_script_and_json() {
        let cli = Cli::try_parse_from(["casebook", "session", "case.txt", "--json"]).unwrap();

        match cli.command {
            Commands::Session(cmd) => {
                assert_eq!(cmd.script, Some(PathBuf::from("case.txt")));
                assert!(cmd.json);
            }
            Commands::Config(_) => panic!("expected session"),
        }
    }

    #[test]
    fn cli_parses_session_reading_stdin() {
        let cli = Cli::try_parse_from(["casebook", "session"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Session(SessionCommand {
                script: None,
                json: false
            })
        ));
    }

    #[test]
    fn cli_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["casebook", "serve"]).is_err());
    }

    #[test]
    fn syntax_errors_are_user_errors() {
        let err = anyhow::Error::new(SessionError::Syntax {
            line: 3,
            message: "bad".to_string(),
        })
        .context("Session stopped");

        assert!(is_user_error(&err));
    }

    #[test]
    fn missing_script_is_a_user_error() {
        let cmd = SessionCommand {
            script: Some(PathBuf::from("/definitely/not/here.casebook")),
            json: false,
        };

        let err = handle_session(&cmd, &Config::default()).unwrap_err();

        assert!(is_user_error(&err));
        assert!(err.to_string().contains("Failed to open script"));
    }

    #[test]
    fn broken_output_is_an_internal_error() {
        let err = anyhow::Error::new(SessionError::Io(io::Error::other("pipe closed")));

        assert!(!is_user_error(&err));
    }

    #[test]
    fn cli_parses_config_json_flag() {
        let cli = Cli::try_parse_from(["casebook", "config", "--json"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommand { json: true })
        ));
    }

    #[test]
    fn config_json_uses_serialized_field_names() {
        let json = config_json(&Config::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["drop_mode"], "overwrite");
        assert_eq!(value["unknown_date_last"], false);
        assert_eq!(value["labels"]["time"], "--:--");
    }

    #[test]
    fn config_lines_show_defaults() {
        let lines = config_lines(&Config::default());

        assert!(lines.contains(&"drop_mode = overwrite".to_string()));
        assert!(lines.contains(&"unknown_time_label = --:--".to_string()));
    }
}
