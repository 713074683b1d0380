//! Chord theory adapter
//!
//! Maps chord symbols to pitch names. The [`ChordTheory`] trait is the seam
//! the playback concept depends on; [`BuiltinTheory`] is the default engine.

mod chord;

use thiserror::Error;
use tracing::debug;

pub use chord::spell_chord;

/// Octave assigned to every spelled note by default
pub const DEFAULT_OCTAVE: i8 = 4;

/// Errors from the theory adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    #[error("Invalid chord specified: '{0}'.")]
    InvalidChord(String),
}

/// Chord symbol to pitch-name mapping
pub trait ChordTheory: Send + Sync {
    /// Pitch names of a single chord, e.g. `Cmaj7` -> `[C4, E4, G4, B4]`
    fn notes_for_chord(&self, symbol: &str) -> Result<Vec<String>, TheoryError>;

    /// Pitch names for each chord in order; the first invalid symbol fails the call
    fn notes_for_progression(&self, symbols: &[String]) -> Result<Vec<Vec<String>>, TheoryError> {
        debug!(count = symbols.len(), "notes_for_progression: called");
        symbols.iter().map(|s| self.notes_for_chord(s)).collect()
    }
}

/// Self-contained chord speller
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTheory {
    octave: i8,
}

impl BuiltinTheory {
    pub fn new() -> Self {
        Self::with_octave(DEFAULT_OCTAVE)
    }

    pub fn with_octave(octave: i8) -> Self {
        Self { octave }
    }
}

impl Default for BuiltinTheory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChordTheory for BuiltinTheory {
    fn notes_for_chord(&self, symbol: &str) -> Result<Vec<String>, TheoryError> {
        debug!(%symbol, "BuiltinTheory::notes_for_chord: called");
        spell_chord(symbol, self.octave).ok_or_else(|| TheoryError::InvalidChord(symbol.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_for_chord() {
        let theory = BuiltinTheory::new();
        assert_eq!(theory.notes_for_chord("Cmaj7").unwrap(), vec!["C4", "E4", "G4", "B4"]);
    }

    #[test]
    fn test_invalid_chord_message() {
        let theory = BuiltinTheory::new();
        let err = theory.notes_for_chord("InvalidChordXYZ").unwrap_err();
        assert_eq!(err, TheoryError::InvalidChord("InvalidChordXYZ".to_string()));
        assert_eq!(err.to_string(), "Invalid chord specified: 'InvalidChordXYZ'.");
    }

    #[test]
    fn test_notes_for_progression() {
        let theory = BuiltinTheory::new();
        let chords = vec!["C".to_string(), "Am".to_string(), "G7".to_string()];
        let notes = theory.notes_for_progression(&chords).unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[1], vec!["A4", "C4", "E4"]);
    }

    #[test]
    fn test_notes_for_progression_reports_first_invalid() {
        let theory = BuiltinTheory::new();
        let chords = vec!["C".to_string(), "Xq".to_string(), "Nope".to_string()];
        let err = theory.notes_for_progression(&chords).unwrap_err();
        assert_eq!(err.to_string(), "Invalid chord specified: 'Xq'.");
    }

    #[test]
    fn test_empty_progression() {
        let theory = BuiltinTheory::new();
        assert!(theory.notes_for_progression(&[]).unwrap().is_empty());
    }
}
