//! Chord symbol parsing and note spelling
//!
//! Symbols are `<root><quality>[/<bass>]`: a root letter A-G with up to two
//! accidentals, a quality suffix from a fixed vocabulary, and an optional
//! slash bass note. Chord tones are spelled by scale degree so that `Ebmaj7`
//! yields `Eb G Bb D` rather than enharmonic sharps.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Letter names in scale order
const LETTERS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

/// Pitch class of each natural letter
const NATURAL_PITCH: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Fallback spelling when degree spelling would need more than two accidentals
const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

static SYMBOL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([A-G])(##|bb|#|b)?([^/]*)(?:/([A-G])(##|bb|#|b)?)?$").ok());

/// A chord tone as (scale degree, semitones above the root)
type Tone = (u8, i32);

const MAJOR: &[Tone] = &[(1, 0), (3, 4), (5, 7)];
const MINOR: &[Tone] = &[(1, 0), (3, 3), (5, 7)];
const DIMINISHED: &[Tone] = &[(1, 0), (3, 3), (5, 6)];
const AUGMENTED: &[Tone] = &[(1, 0), (3, 4), (5, 8)];
const SUS2: &[Tone] = &[(1, 0), (2, 2), (5, 7)];
const SUS4: &[Tone] = &[(1, 0), (4, 5), (5, 7)];
const POWER: &[Tone] = &[(1, 0), (5, 7)];
const SIXTH: &[Tone] = &[(1, 0), (3, 4), (5, 7), (6, 9)];
const MINOR_SIXTH: &[Tone] = &[(1, 0), (3, 3), (5, 7), (6, 9)];
const DOMINANT_7: &[Tone] = &[(1, 0), (3, 4), (5, 7), (7, 10)];
const MAJOR_7: &[Tone] = &[(1, 0), (3, 4), (5, 7), (7, 11)];
const MINOR_7: &[Tone] = &[(1, 0), (3, 3), (5, 7), (7, 10)];
const MINOR_MAJOR_7: &[Tone] = &[(1, 0), (3, 3), (5, 7), (7, 11)];
const DIMINISHED_7: &[Tone] = &[(1, 0), (3, 3), (5, 6), (7, 9)];
const HALF_DIMINISHED: &[Tone] = &[(1, 0), (3, 3), (5, 6), (7, 10)];
const AUGMENTED_7: &[Tone] = &[(1, 0), (3, 4), (5, 8), (7, 10)];
const SEVEN_SUS4: &[Tone] = &[(1, 0), (4, 5), (5, 7), (7, 10)];
const SEVEN_FLAT_5: &[Tone] = &[(1, 0), (3, 4), (5, 6), (7, 10)];
const ADD_9: &[Tone] = &[(1, 0), (3, 4), (5, 7), (9, 14)];
const MINOR_ADD_9: &[Tone] = &[(1, 0), (3, 3), (5, 7), (9, 14)];
const NINTH: &[Tone] = &[(1, 0), (3, 4), (5, 7), (7, 10), (9, 14)];
const MAJOR_9: &[Tone] = &[(1, 0), (3, 4), (5, 7), (7, 11), (9, 14)];
const MINOR_9: &[Tone] = &[(1, 0), (3, 3), (5, 7), (7, 10), (9, 14)];
const SEVEN_FLAT_9: &[Tone] = &[(1, 0), (3, 4), (5, 7), (7, 10), (9, 13)];
const SEVEN_SHARP_9: &[Tone] = &[(1, 0), (3, 4), (5, 7), (7, 10), (9, 15)];
const ELEVENTH: &[Tone] = &[(1, 0), (3, 4), (5, 7), (7, 10), (9, 14), (11, 17)];
const MINOR_11: &[Tone] = &[(1, 0), (3, 3), (5, 7), (7, 10), (9, 14), (11, 17)];
const SEVEN_SHARP_11: &[Tone] = &[(1, 0), (3, 4), (5, 7), (7, 10), (11, 18)];
const THIRTEENTH: &[Tone] = &[(1, 0), (3, 4), (5, 7), (7, 10), (9, 14), (13, 21)];
const MAJOR_13: &[Tone] = &[(1, 0), (3, 4), (5, 7), (7, 11), (9, 14), (13, 21)];
const MINOR_13: &[Tone] = &[(1, 0), (3, 3), (5, 7), (7, 10), (9, 14), (13, 21)];

/// Look up the chord tones for a quality suffix
fn quality_tones(suffix: &str) -> Option<&'static [Tone]> {
    let tones = match suffix {
        "" | "maj" | "M" => MAJOR,
        "m" | "min" | "-" => MINOR,
        "dim" | "°" | "o" => DIMINISHED,
        "aug" | "+" => AUGMENTED,
        "sus2" => SUS2,
        "sus4" | "sus" => SUS4,
        "5" => POWER,
        "6" | "maj6" => SIXTH,
        "m6" | "min6" => MINOR_SIXTH,
        "7" | "dom7" => DOMINANT_7,
        "maj7" | "M7" | "Δ" | "Δ7" => MAJOR_7,
        "m7" | "min7" | "-7" => MINOR_7,
        "mMaj7" | "mmaj7" | "minmaj7" | "m(maj7)" => MINOR_MAJOR_7,
        "dim7" | "°7" | "o7" => DIMINISHED_7,
        "m7b5" | "min7b5" | "ø" | "ø7" => HALF_DIMINISHED,
        "aug7" | "+7" | "7#5" => AUGMENTED_7,
        "7sus4" | "7sus" => SEVEN_SUS4,
        "7b5" => SEVEN_FLAT_5,
        "add9" => ADD_9,
        "madd9" | "m(add9)" => MINOR_ADD_9,
        "9" => NINTH,
        "maj9" | "M9" => MAJOR_9,
        "m9" | "min9" => MINOR_9,
        "7b9" => SEVEN_FLAT_9,
        "7#9" => SEVEN_SHARP_9,
        "11" => ELEVENTH,
        "m11" | "min11" => MINOR_11,
        "7#11" => SEVEN_SHARP_11,
        "13" => THIRTEENTH,
        "maj13" | "M13" => MAJOR_13,
        "m13" | "min13" => MINOR_13,
        _ => return None,
    };
    Some(tones)
}

/// A spelled note name without octave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Spelling {
    letter: usize,
    accidental: i32,
}

impl Spelling {
    fn parse(letter: &str, accidental: Option<&str>) -> Option<Self> {
        let letter_char = letter.chars().next()?;
        let letter = LETTERS.iter().position(|&l| l == letter_char)?;
        let accidental = match accidental.unwrap_or("") {
            "" => 0,
            "#" => 1,
            "##" => 2,
            "b" => -1,
            "bb" => -2,
            _ => return None,
        };
        Some(Self { letter, accidental })
    }

    fn pitch_class(&self) -> i32 {
        (NATURAL_PITCH[self.letter] + self.accidental).rem_euclid(12)
    }

    /// Spell the tone `semitones` above this root on scale degree `degree`
    fn tone(&self, degree: u8, semitones: i32) -> Self {
        let letter = (self.letter + degree as usize - 1) % 7;
        let target = (self.pitch_class() + semitones).rem_euclid(12);
        let accidental = (target - NATURAL_PITCH[letter] + 6).rem_euclid(12) - 6;
        Self { letter, accidental }
    }

    fn name(&self) -> String {
        if self.accidental.abs() > 2 {
            return SHARP_NAMES[self.pitch_class() as usize].to_string();
        }
        let mut name = String::with_capacity(3);
        name.push(LETTERS[self.letter]);
        let mark = if self.accidental > 0 { '#' } else { 'b' };
        for _ in 0..self.accidental.abs() {
            name.push(mark);
        }
        name
    }
}

/// Spell the notes of a chord symbol at the given octave
///
/// Returns None when the symbol is not recognized.
pub fn spell_chord(symbol: &str, octave: i8) -> Option<Vec<String>> {
    debug!(%symbol, %octave, "spell_chord: called");
    let caps = SYMBOL_RE.as_ref()?.captures(symbol.trim())?;

    let root = Spelling::parse(caps.get(1)?.as_str(), caps.get(2).map(|m| m.as_str()))?;
    let suffix = caps.get(3).map_or("", |m| m.as_str());
    let Some(tones) = quality_tones(suffix) else {
        debug!(%suffix, "spell_chord: unknown quality");
        return None;
    };

    let mut notes: Vec<Spelling> = tones.iter().map(|&(degree, semis)| root.tone(degree, semis)).collect();

    if let Some(bass_letter) = caps.get(4) {
        let bass = Spelling::parse(bass_letter.as_str(), caps.get(5).map(|m| m.as_str()))?;
        debug!(bass = %bass.name(), "spell_chord: slash bass");
        notes.retain(|n| n.pitch_class() != bass.pitch_class());
        notes.insert(0, bass);
    }

    Some(notes.iter().map(|n| format!("{}{}", n.name(), octave)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spell(symbol: &str) -> Vec<String> {
        spell_chord(symbol, 4).unwrap_or_else(|| panic!("expected {symbol} to parse"))
    }

    #[test]
    fn test_sevenths() {
        assert_eq!(spell("Cmaj7"), vec!["C4", "E4", "G4", "B4"]);
        assert_eq!(spell("Fmaj7"), vec!["F4", "A4", "C4", "E4"]);
        assert_eq!(spell("G7"), vec!["G4", "B4", "D4", "F4"]);
        assert_eq!(spell("Dmin7"), vec!["D4", "F4", "A4", "C4"]);
        assert_eq!(spell("Dm7"), vec!["D4", "F4", "A4", "C4"]);
        assert_eq!(spell("Bm7b5"), vec!["B4", "D4", "F4", "A4"]);
    }

    #[test]
    fn test_triads() {
        assert_eq!(spell("C"), vec!["C4", "E4", "G4"]);
        assert_eq!(spell("Am"), vec!["A4", "C4", "E4"]);
        assert_eq!(spell("Bdim"), vec!["B4", "D4", "F4"]);
        assert_eq!(spell("Caug"), vec!["C4", "E4", "G#4"]);
        assert_eq!(spell("Dsus4"), vec!["D4", "G4", "A4"]);
        assert_eq!(spell("E5"), vec!["E4", "B4"]);
    }

    #[test]
    fn test_accidentals_spelled_by_degree() {
        assert_eq!(spell("Ebmaj7"), vec!["Eb4", "G4", "Bb4", "D4"]);
        assert_eq!(spell("F#m"), vec!["F#4", "A4", "C#4"]);
        assert_eq!(spell("Bb7"), vec!["Bb4", "D4", "F4", "Ab4"]);
        assert_eq!(spell("C#dim7"), vec!["C#4", "E4", "G4", "Bb4"]);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(spell("Cadd9"), vec!["C4", "E4", "G4", "D4"]);
        assert_eq!(spell("G7b9"), vec!["G4", "B4", "D4", "F4", "Ab4"]);
        assert_eq!(spell("C13"), vec!["C4", "E4", "G4", "Bb4", "D4", "A4"]);
    }

    #[test]
    fn test_slash_chords() {
        assert_eq!(spell("C/E"), vec!["E4", "C4", "G4"]);
        assert_eq!(spell("Am/G"), vec!["G4", "A4", "C4", "E4"]);
        assert_eq!(spell("D/F#"), vec!["F#4", "D4", "A4"]);
    }

    #[test]
    fn test_octave_parameter() {
        assert_eq!(spell_chord("C", 3).unwrap(), vec!["C3", "E3", "G3"]);
    }

    #[test]
    fn test_unrecognized_symbols() {
        assert!(spell_chord("InvalidChordXYZ", 4).is_none());
        assert!(spell_chord("", 4).is_none());
        assert!(spell_chord("H7", 4).is_none());
        assert!(spell_chord("Cxyz", 4).is_none());
        assert!(spell_chord("c", 4).is_none());
        assert!(spell_chord("C/X", 4).is_none());
    }
}
