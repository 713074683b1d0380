//! Response parsing
//!
//! Pure functions that turn untrusted model text into chord data. No network,
//! no store: a string goes in, a structured result or a [`ParseFailure`]
//! comes out.

use thiserror::Error;
use tracing::debug;

/// Reason a model response yielded nothing usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("LLM did not return valid chord suggestions.")]
    NoChordSuggestions,

    #[error("LLM did not return a valid chord progression.")]
    NoProgressions,
}

/// Split a comma-separated answer into chord symbols
///
/// Tokens are trimmed and empty ones dropped. The symbols are not checked
/// against the theory adapter.
pub fn parse_chord_suggestions(text: &str) -> Result<Vec<String>, ParseFailure> {
    debug!(len = text.len(), "parse_chord_suggestions: called");
    let chords: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect();

    if chords.is_empty() {
        debug!("parse_chord_suggestions: no tokens survived");
        return Err(ParseFailure::NoChordSuggestions);
    }
    Ok(chords)
}

/// Split a line-per-progression answer into chord sequences
///
/// Each line is split on whitespace; lines without tokens are dropped. Line
/// lengths are returned as the model produced them.
pub fn parse_progression_suggestions(text: &str) -> Result<Vec<Vec<String>>, ParseFailure> {
    debug!(len = text.len(), "parse_progression_suggestions: called");
    let progressions: Vec<Vec<String>> = text
        .lines()
        .map(|line| line.split_whitespace().map(String::from).collect::<Vec<_>>())
        .filter(|chords| !chords.is_empty())
        .collect();

    if progressions.is_empty() {
        debug!("parse_progression_suggestions: no lines survived");
        return Err(ParseFailure::NoProgressions);
    }
    Ok(progressions)
}
