//! ChordBuilder CLI
//!
//! Entry point for `cb`: one subcommand per concept action, plus the
//! interactive slot editor.

use std::fs;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use chordbuilder::cli::{
    Cli, Command, NotesCommand, OutputFormat, PrefsCommand, ProgressionCommand, SettingsCommand, SuggestCommand,
    get_log_path, parse_slot,
};
use chordbuilder::config::Config;
use chordbuilder::domain::{PlaybackSettings, Progression, ProgressionSummary, SuggestionPreferences};
use chordbuilder::error::ActionError;
use chordbuilder::llm::{LlmClient, UnconfiguredClient, create_client};
use chordbuilder::prompts::EMPTY_SLOT;
use chordbuilder::{App, repl};

fn parse_level(level: &str) -> Option<tracing::Level> {
    match level.to_uppercase().as_str() {
        "TRACE" => Some(tracing::Level::TRACE),
        "DEBUG" => Some(tracing::Level::DEBUG),
        "INFO" => Some(tracing::Level::INFO),
        "WARN" | "WARNING" => Some(tracing::Level::WARN),
        "ERROR" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => parse_level(s).unwrap_or_else(|| {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }),
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let format = cli.format;
    if let Err(e) = run(cli).await {
        report_error(&e, format);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(store_dir = %config.storage.store_dir.display(), "ChordBuilder loaded config");

    let llm: Arc<dyn LlmClient> = if cli.command.needs_llm() {
        debug!("run: command needs the LLM");
        config.validate()?;
        create_client(&config.llm)?
    } else {
        Arc::new(UnconfiguredClient)
    };

    let app = App::open(&config, llm)?;
    let result = dispatch(&app, cli.command, cli.format).await;
    app.shutdown().await?;
    result
}

/// Print the single error message; JSON output gets `{"error": ...}`
fn report_error(e: &eyre::Report, format: OutputFormat) {
    let message = match e.downcast_ref::<ActionError>() {
        Some(action) => action.message.clone(),
        None => format!("{:#}", e),
    };
    debug!(%message, "report_error: called");
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "error": message })),
        OutputFormat::Text => eprintln!("{}", message.red()),
    }
}

async fn dispatch(app: &App, command: Command, format: OutputFormat) -> Result<()> {
    debug!(?command, "dispatch: called");
    match command {
        Command::Progression { command } => cmd_progression(app, command, format).await,
        Command::Settings { command } => cmd_settings(app, command, format).await,
        Command::Notes { command } => cmd_notes(app, command, format),
        Command::Prefs { command } => cmd_prefs(app, command, format).await,
        Command::Suggest { command } => cmd_suggest(app, command, format).await,
        Command::Edit { id } => repl::run_editor(app, &id).await,
    }
}

/// Print `value` as pretty JSON or through the text renderer
fn output<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", text(value)),
    }
    Ok(())
}

fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn render_progression(p: &Progression) -> String {
    let mut lines = vec![
        format!("{} ({})", p.name.bold(), p.id),
        format!("Updated: {}", format_timestamp(p.updated_at)),
    ];
    if p.is_empty() {
        lines.push("  (no slots)".dimmed().to_string());
    }
    for (i, slot) in p.chord_sequence.iter().enumerate() {
        lines.push(format!("  {}: {}", i, slot.chord.as_deref().unwrap_or(EMPTY_SLOT)));
    }
    lines.join("\n")
}

fn render_list(list: &[ProgressionSummary]) -> String {
    if list.is_empty() {
        return "No progressions found".to_string();
    }
    let mut lines = vec![format!("{:<48} {}", "ID", "NAME"), "-".repeat(70)];
    lines.extend(list.iter().map(|s| format!("{:<48} {}", s.id, s.name)));
    lines.join("\n")
}

fn render_settings(s: &PlaybackSettings) -> String {
    format!("Instrument: {}\nSeconds per chord: {}", s.instrument, s.seconds_per_chord)
}

fn render_preferences(p: &SuggestionPreferences) -> String {
    format!("Genre: {}\nComplexity: {}\nKey: {}", p.genre, p.complexity, p.key)
}

fn render_chord_notes(pairs: &[(String, Vec<String>)]) -> String {
    pairs
        .iter()
        .map(|(chord, notes)| format!("{}: {}", chord, notes.join(" ")))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn cmd_progression(app: &App, command: ProgressionCommand, format: OutputFormat) -> Result<()> {
    debug!(?command, "cmd_progression: called");
    match command {
        ProgressionCommand::Create { name } => {
            let p = app.create_progression(&name).await?;
            output(format, &p, |p| format!("Created progression {} ({})", p.name.bold(), p.id))
        }
        ProgressionCommand::List => {
            let list = app.list_progressions().await?;
            output(format, &list, |l| render_list(l))
        }
        ProgressionCommand::Show { id } => {
            let p = app.get_progression(&id).await?;
            output(format, &p, render_progression)
        }
        ProgressionCommand::Rename { id, name } => {
            let p = app.rename_progression(&id, &name).await?;
            output(format, &p, render_progression)
        }
        ProgressionCommand::Delete { id } => {
            app.delete_progression(&id).await?;
            output(format, &serde_json::json!({ "deleted": id }), |_| {
                format!("Deleted progression {}", id)
            })
        }
        ProgressionCommand::AddSlot { id } => {
            let p = app.add_slot(&id).await?;
            output(format, &p, render_progression)
        }
        ProgressionCommand::SetChord { id, position, chord } => {
            let p = app.set_chord(&id, position, &chord).await?;
            output(format, &p, render_progression)
        }
        ProgressionCommand::DeleteChord { id, position } => {
            let p = app.delete_chord(&id, position).await?;
            output(format, &p, render_progression)
        }
        ProgressionCommand::DeleteSlot { id, position } => {
            let p = app.delete_slot(&id, position).await?;
            output(format, &p, render_progression)
        }
        ProgressionCommand::Reorder { id, old, new } => {
            let p = app.reorder_slots(&id, old, new).await?;
            output(format, &p, render_progression)
        }
    }
}

async fn cmd_settings(app: &App, command: SettingsCommand, format: OutputFormat) -> Result<()> {
    debug!(?command, "cmd_settings: called");
    let settings = match command {
        SettingsCommand::Show { id } => app.get_playback_settings(&id).await?,
        SettingsCommand::Instrument { id, instrument } => app.set_instrument(&id, &instrument).await?,
        SettingsCommand::Seconds { id, seconds } => app.set_seconds_per_chord(&id, seconds).await?,
        SettingsCommand::Delete { id } => {
            app.delete_settings(&id).await?;
            return output(format, &serde_json::json!({ "deleted": id }), |_| {
                format!("Deleted playback settings for {}", id)
            });
        }
    };
    output(format, &settings, render_settings)
}

fn cmd_notes(app: &App, command: NotesCommand, format: OutputFormat) -> Result<()> {
    debug!(?command, "cmd_notes: called");
    match command {
        NotesCommand::Chord { symbol } => {
            let notes = app.get_chord_notes(&symbol)?;
            output(format, &notes, |n| n.join(" "))
        }
        NotesCommand::Progression { symbols } => {
            let notes = app.get_progression_notes(&symbols)?;
            match format {
                OutputFormat::Json => output(format, &notes, |_| String::new()),
                OutputFormat::Text => {
                    let pairs: Vec<_> = symbols.into_iter().zip(notes).collect();
                    output(format, &pairs, |p| render_chord_notes(p))
                }
            }
        }
    }
}

async fn cmd_prefs(app: &App, command: PrefsCommand, format: OutputFormat) -> Result<()> {
    debug!(?command, "cmd_prefs: called");
    let preferences = match command {
        PrefsCommand::Show { id } => app.get_suggestion_preferences(&id).await?,
        PrefsCommand::Genre { id, genre } => app.set_genre(&id, &genre).await?,
        PrefsCommand::Complexity { id, complexity } => app.set_complexity(&id, &complexity).await?,
        PrefsCommand::Key { id, key } => app.set_key(&id, &key).await?,
        PrefsCommand::Delete { id } => {
            app.delete_preferences(&id).await?;
            return output(format, &serde_json::json!({ "deleted": id }), |_| {
                format!("Deleted suggestion preferences for {}", id)
            });
        }
    };
    output(format, &preferences, render_preferences)
}

async fn cmd_suggest(app: &App, command: SuggestCommand, format: OutputFormat) -> Result<()> {
    debug!(?command, "cmd_suggest: called");
    match command {
        SuggestCommand::Chord { id, position, chords } => {
            let chords = match chords {
                Some(tokens) => tokens.iter().map(|t| parse_slot(t)).collect(),
                None => app.get_progression(&id).await?.chords(),
            };
            let suggestions = app.suggest_chord(&id, &chords, position).await?;
            output(format, &suggestions, |s| s.join(", "))
        }
        SuggestCommand::Progression { id, length } => {
            let progressions = app.suggest_progression(&id, length).await?;
            output(format, &progressions, |ps| {
                ps.iter().map(|p| p.join(" ")).collect::<Vec<_>>().join("\n")
            })
        }
    }
}
