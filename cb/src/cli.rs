//! CLI command definitions and subcommands

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::prompts::EMPTY_SLOT;

/// ChordBuilder - chord progressions with AI suggestions
#[derive(Parser)]
#[command(
    name = "cb",
    about = "Build chord progressions, tune playback and ask an LLM for suggestions",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create, edit and list progressions
    Progression {
        #[command(subcommand)]
        command: ProgressionCommand,
    },

    /// Playback settings of a progression
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Spell chords as pitch names
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },

    /// Suggestion preferences of a progression
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },

    /// Ask the LLM for chords or progressions
    Suggest {
        #[command(subcommand)]
        command: SuggestCommand,
    },

    /// Interactive slot editor for one progression
    Edit {
        /// Progression ID
        id: String,
    },
}

impl Command {
    /// Whether the command sends requests to the LLM
    pub fn needs_llm(&self) -> bool {
        matches!(self, Command::Suggest { .. })
    }
}

#[derive(Debug, Subcommand)]
pub enum ProgressionCommand {
    /// Create an empty progression
    Create { name: String },

    /// List all progressions
    List,

    /// Show one progression
    Show { id: String },

    /// Rename a progression
    Rename { id: String, name: String },

    /// Delete a progression with its settings and preferences
    Delete { id: String },

    /// Append an empty slot
    AddSlot { id: String },

    /// Put a chord into a slot
    SetChord {
        id: String,
        #[arg(allow_negative_numbers = true)]
        position: i64,
        chord: String,
    },

    /// Clear the chord in a slot
    DeleteChord {
        id: String,
        #[arg(allow_negative_numbers = true)]
        position: i64,
    },

    /// Remove a slot; later slots shift down
    DeleteSlot {
        id: String,
        #[arg(allow_negative_numbers = true)]
        position: i64,
    },

    /// Move a slot from one position to another
    Reorder {
        id: String,
        #[arg(allow_negative_numbers = true)]
        old: i64,
        #[arg(allow_negative_numbers = true)]
        new: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show playback settings
    Show { id: String },

    /// Set the instrument (Piano, Guitar, Synthesizer)
    Instrument { id: String, instrument: String },

    /// Set seconds per chord (1 to 10)
    Seconds {
        id: String,
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },

    /// Delete playback settings
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum NotesCommand {
    /// Notes of a single chord
    Chord { symbol: String },

    /// Notes of each chord in order
    Progression {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    /// Show suggestion preferences
    Show { id: String },

    /// Set the genre
    Genre { id: String, genre: String },

    /// Set the complexity
    Complexity { id: String, complexity: String },

    /// Set the key
    Key { id: String, key: String },

    /// Delete suggestion preferences
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum SuggestCommand {
    /// Candidate chords for one position
    Chord {
        id: String,
        #[arg(allow_negative_numbers = true)]
        position: i64,

        /// Chord context, comma separated, `_` for empty (default: the stored progression)
        #[arg(long, value_delimiter = ',')]
        chords: Option<Vec<String>>,
    },

    /// Whole progressions of the given length
    Progression {
        id: String,
        #[arg(allow_negative_numbers = true)]
        length: i64,
    },
}

/// Map a command-line chord token to a slot value; `_` or blank is empty
pub fn parse_slot(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() || token == EMPTY_SLOT {
        None
    } else {
        Some(token.to_string())
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chordbuilder")
        .join("logs")
        .join("chordbuilder.log")
}

/// Output format for command results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_progression_create() {
        let cli = Cli::try_parse_from(["cb", "progression", "create", "My Song"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(matches!(
            cli.command,
            Command::Progression {
                command: ProgressionCommand::Create { ref name }
            } if name == "My Song"
        ));
    }

    #[test]
    fn test_cli_negative_position() {
        let cli = Cli::try_parse_from(["cb", "progression", "set-chord", "p1", "-1", "C"]).unwrap();
        match cli.command {
            Command::Progression {
                command: ProgressionCommand::SetChord { position, chord, .. },
            } => {
                assert_eq!(position, -1);
                assert_eq!(chord, "C");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cb", "notes", "chord", "Cmaj7", "--format", "json", "-l", "debug"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(!cli.command.needs_llm());
    }

    #[test]
    fn test_cli_suggest_chords_list() {
        let cli = Cli::try_parse_from(["cb", "suggest", "chord", "p1", "1", "--chords", "C,_,G7"]).unwrap();
        assert!(cli.command.needs_llm());
        match cli.command {
            Command::Suggest {
                command: SuggestCommand::Chord { chords, position, .. },
            } => {
                assert_eq!(position, 1);
                let slots: Vec<_> = chords.unwrap().iter().map(|c| parse_slot(c)).collect();
                assert_eq!(slots, vec![Some("C".to_string()), None, Some("G7".to_string())]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_notes_progression_requires_symbols() {
        assert!(Cli::try_parse_from(["cb", "notes", "progression"]).is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_log_path() {
        assert!(get_log_path().ends_with("chordbuilder/logs/chordbuilder.log"));
    }
}
