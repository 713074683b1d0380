//! Suggestion pipeline
//!
//! Preferences in, prompt out, model text back, parsed chords returned.

mod parse;
mod pipeline;

pub use parse::{ParseFailure, parse_chord_suggestions, parse_progression_suggestions};
pub use pipeline::{SuggestChord, SuggestError, SuggestOptions};
